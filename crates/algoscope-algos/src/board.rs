//! Grid backtracking family: N-Queens, Sudoku and rat in a maze.
//!
//! Each solver stops at its first solution. The picks along that solution
//! are never retracted, so the final state shows the solved board; every
//! abandoned branch is unpicked before its sibling is tried.

use std::collections::BTreeMap;

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Emit, Fold, Highlight, HighlightMode, Id, Marker,
    Referencing, Registry, Retraction, Step, StepLog, Terminal, TreeNode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{CallTree, TreeBuilder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellKind {
    #[default]
    Open,
    Wall,
    /// Pre-filled and never picked.
    Given,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub id: Id,
    pub row: usize,
    pub col: usize,
    pub value: i64,
    pub kind: CellKind,
}

/// A row-major grid of cells with ids `1..=rows*cols`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
}

impl Board {
    /// An empty open board.
    pub fn open(rows: usize, cols: usize) -> Self {
        Self::build(rows, cols, |_, _| (0, CellKind::Open))
    }

    fn build(rows: usize, cols: usize, mut cell: impl FnMut(usize, usize) -> (i64, CellKind)) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let (value, kind) = cell(row, col);
                cells.push(Cell {
                    id: Id((row * cols + col) as u64 + 1),
                    row,
                    col,
                    value,
                    kind,
                });
            }
        }
        Self { rows, cols, cells }
    }

    /// Sudoku board: non-zero entries are givens. Ragged rows are padded
    /// with blanks.
    pub fn sudoku(grid: &[Vec<i64>]) -> Self {
        let rows = grid.len();
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        Self::build(rows, cols, |r, c| match grid[r].get(c).copied().unwrap_or(0) {
            0 => (0, CellKind::Open),
            v => (v, CellKind::Given),
        })
    }

    /// Maze board: `0` is a wall, anything else is open floor.
    pub fn maze(grid: &[Vec<i64>]) -> Self {
        let rows = grid.len();
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        Self::build(rows, cols, |r, c| match grid[r].get(c).copied().unwrap_or(0) {
            0 => (0, CellKind::Wall),
            _ => (0, CellKind::Open),
        })
    }

    pub fn at(&self, row: usize, col: usize) -> Option<&Cell> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    fn slot(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

/// Steps of the board family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoardStep {
    Init { rows: usize, cols: usize, cells: Vec<Cell> },
    AddNode { node: TreeNode },
    Check { cell: Id, value: i64, ok: bool },
    Pick { node: Id, cell: Id, value: i64 },
    Unpick { node: Id, cell: Id },
    Solved,
    NoSolution,
    Done,
}

impl Terminal for BoardStep {
    fn is_terminal(&self) -> bool {
        matches!(self, BoardStep::Done)
    }
}

impl Retraction for BoardStep {
    fn marker(&self) -> Option<Marker> {
        match self {
            BoardStep::Pick { node, .. } => Some(Marker::Enter(*node)),
            BoardStep::Unpick { node, .. } => Some(Marker::Retract(*node)),
            _ => None,
        }
    }
}

impl Referencing for BoardStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            BoardStep::AddNode { node } => node.parent.into_iter().collect(),
            BoardStep::Check { cell, .. } => vec![*cell],
            BoardStep::Pick { node, cell, .. } | BoardStep::Unpick { node, cell } => {
                vec![*node, *cell]
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardOutcome {
    Solved,
    NoSolution,
}

/// Visual state of the board family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub rows: usize,
    pub cols: usize,
    pub cells: BTreeMap<Id, Cell>,
    pub tree: CallTree,
    /// `(node, cell)` pairs currently picked, outermost first.
    pub path: Vec<(Id, Id)>,
    pub active: Option<Id>,
    pub highlight: Option<Highlight>,
    pub outcome: Option<BoardOutcome>,
    pub finished: bool,
}

impl BoardState {
    /// Cell values laid out by row.
    pub fn grid(&self) -> Vec<Vec<i64>> {
        let mut grid = vec![vec![0; self.cols]; self.rows];
        for cell in self.cells.values() {
            grid[cell.row][cell.col] = cell.value;
        }
        grid
    }

    /// Cells on the current path.
    pub fn path_cells(&self) -> Vec<Id> {
        self.path.iter().map(|&(_, cell)| cell).collect()
    }
}

impl Registry for BoardState {
    fn knows(&self, id: Id) -> bool {
        self.tree.contains(id) || self.cells.contains_key(&id)
    }
}

impl Fold for BoardState {
    type Kind = BoardStep;

    fn apply(&mut self, step: &Step<BoardStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            BoardStep::Init { rows, cols, cells } => {
                *self = Self::default();
                self.rows = *rows;
                self.cols = *cols;
                self.cells = cells.iter().map(|c| (c.id, c.clone())).collect();
            }
            BoardStep::AddNode { node } => {
                if node.is_root() {
                    self.active = Some(node.id);
                }
                self.tree.insert(node.clone());
            }
            BoardStep::Check { cell, ok, .. } => {
                let mode = if *ok {
                    HighlightMode::Candidate
                } else {
                    HighlightMode::Rejected
                };
                self.highlight = Some(Highlight::new([*cell], mode));
            }
            BoardStep::Pick { node, cell, value } => {
                if let Some(c) = self.cells.get_mut(cell) {
                    c.value = *value;
                }
                self.path.push((*node, *cell));
                self.active = Some(*node);
            }
            BoardStep::Unpick { node, cell } => {
                if let Some(c) = self.cells.get_mut(cell) {
                    c.value = 0;
                }
                self.path.pop();
                self.active = self.tree.get(*node).and_then(|n| n.parent);
            }
            BoardStep::Solved => {
                self.outcome = Some(BoardOutcome::Solved);
                self.highlight = Some(Highlight::new(self.path_cells(), HighlightMode::Found));
            }
            BoardStep::NoSolution => {
                self.outcome = Some(BoardOutcome::NoSolution);
            }
            BoardStep::Done => self.finished = true,
        }
    }
}

/// Rebuild the board state after `steps[index]`.
pub fn reconstruct_board(steps: &[Step<BoardStep>], index: usize) -> BoardState {
    reconstruct(steps, index)
}

/// Node bookkeeping for one solver run. The stack holds the open node
/// chain; its top is the parent of the next pick.
struct Placer {
    tree: TreeBuilder,
    stack: Vec<Id>,
}

impl Placer {
    fn start(out: &mut impl Emit<BoardStep>, board: &Board, label: &str) -> Self {
        out.emit(
            Step::new(BoardStep::Init {
                rows: board.rows,
                cols: board.cols,
                cells: board.cells.clone(),
            })
            .lines([1])
            .explain(format!("{} on a {}x{} board", label, board.rows, board.cols)),
        );
        let mut tree = TreeBuilder::starting_at(board.cells.len() as u64 + 1);
        let root = tree.root(label);
        let id = root.id;
        out.emit(Step::new(BoardStep::AddNode { node: root }));
        Self {
            tree,
            stack: vec![id],
        }
    }

    fn check(&self, out: &mut impl Emit<BoardStep>, cell: &Cell, value: i64, ok: bool, why: String) {
        out.emit(
            Step::new(BoardStep::Check {
                cell: cell.id,
                value,
                ok,
            })
            .lines([2])
            .explain(why),
        );
    }

    fn pick(&mut self, out: &mut impl Emit<BoardStep>, cell: &Cell, value: i64) {
        let parent = self.stack.last().copied().unwrap_or_default();
        let node = self
            .tree
            .child(parent, format!("({},{})={}", cell.row, cell.col, value));
        let id = node.id;
        out.emit(Step::new(BoardStep::AddNode { node }));
        out.emit(
            Step::new(BoardStep::Pick {
                node: id,
                cell: cell.id,
                value,
            })
            .lines([3])
            .explain(format!("Place {} at row {}, column {}", value, cell.row, cell.col)),
        );
        self.stack.push(id);
    }

    fn unpick(&mut self, out: &mut impl Emit<BoardStep>, cell: &Cell) {
        if let Some(node) = self.stack.pop() {
            out.emit(
                Step::new(BoardStep::Unpick {
                    node,
                    cell: cell.id,
                })
                .lines([5])
                .explain(format!("Dead end, clear row {}, column {}", cell.row, cell.col)),
            );
        }
    }

    fn verdict(self, out: &mut impl Emit<BoardStep>, name: &str, solved: bool) {
        debug!(algorithm = name, solved, nodes = self.tree.tree().len(), "board search finished");
        let (kind, text) = if solved {
            (BoardStep::Solved, "Found a solution")
        } else {
            (BoardStep::NoSolution, "No arrangement works")
        };
        out.emit(Step::new(kind).lines([4]).explain(text));
        out.emit(Step::new(BoardStep::Done));
    }
}

/// Place `n` queens so none attack each other, one row at a time.
pub fn n_queens(n: usize) -> StepLog<BoardStep> {
    fn safe(queens: &[usize], col: usize) -> bool {
        let row = queens.len();
        queens
            .iter()
            .enumerate()
            .all(|(r, &c)| c != col && row - r != col.abs_diff(c))
    }

    fn place(
        out: &mut impl Emit<BoardStep>,
        placer: &mut Placer,
        board: &Board,
        queens: &mut Vec<usize>,
    ) -> bool {
        let row = queens.len();
        if row == board.rows {
            return true;
        }
        for col in 0..board.cols {
            let Some(cell) = board.at(row, col) else {
                continue;
            };
            let ok = safe(queens, col);
            placer.check(
                out,
                cell,
                1,
                ok,
                if ok {
                    format!("Row {}, column {} is free", row, col)
                } else {
                    format!("Row {}, column {} is attacked", row, col)
                },
            );
            if !ok {
                continue;
            }
            placer.pick(out, cell, 1);
            queens.push(col);
            if place(out, placer, board, queens) {
                return true;
            }
            queens.pop();
            placer.unpick(out, cell);
        }
        false
    }

    record("n-queens", |out| {
        let board = Board::open(n, n);
        let mut placer = Placer::start(out, &board, &format!("{} queens", n));
        let mut queens = Vec::with_capacity(n);
        let solved = place(out, &mut placer, &board, &mut queens);
        placer.verdict(out, "n-queens", solved);
    })
}

/// Fill a square Sudoku grid whose side is a perfect square. Zero marks a
/// blank.
pub fn sudoku(grid: &[Vec<i64>]) -> StepLog<BoardStep> {
    struct Puzzle {
        n: usize,
        size: usize,
        values: Vec<i64>,
    }

    impl Puzzle {
        fn allows(&self, slot: usize, v: i64) -> bool {
            let (row, col) = (slot / self.n, slot % self.n);
            let (br, bc) = (row - row % self.size, col - col % self.size);
            (0..self.n).all(|i| {
                let in_row = row * self.n + i;
                let in_col = i * self.n + col;
                let in_box = (br + i / self.size) * self.n + bc + i % self.size;
                [in_row, in_col, in_box]
                    .iter()
                    .all(|&other| other == slot || self.values[other] != v)
            })
        }
    }

    fn fill(
        out: &mut impl Emit<BoardStep>,
        placer: &mut Placer,
        board: &Board,
        puzzle: &mut Puzzle,
    ) -> bool {
        let Some(slot) = puzzle.values.iter().position(|&v| v == 0) else {
            return true;
        };
        let cell = &board.cells[slot];
        for v in 1..=puzzle.n as i64 {
            let ok = puzzle.allows(slot, v);
            placer.check(
                out,
                cell,
                v,
                ok,
                if ok {
                    format!("{} fits at row {}, column {}", v, cell.row, cell.col)
                } else {
                    format!("{} already appears in this row, column or box", v)
                },
            );
            if !ok {
                continue;
            }
            placer.pick(out, cell, v);
            puzzle.values[slot] = v;
            if fill(out, placer, board, puzzle) {
                return true;
            }
            puzzle.values[slot] = 0;
            placer.unpick(out, cell);
        }
        false
    }

    record("sudoku", |out| {
        let board = Board::sudoku(grid);
        let mut placer = Placer::start(out, &board, "sudoku");
        let n = board.rows;
        let size = (1..=n).find(|s| s * s >= n).unwrap_or(0);
        if board.cols != n || size * size != n {
            debug!(rows = board.rows, cols = board.cols, "grid is not a square of squares");
            placer.verdict(out, "sudoku", false);
            return;
        }
        let mut puzzle = Puzzle {
            n,
            size,
            values: board.cells.iter().map(|c| c.value).collect(),
        };
        let consistent = board.cells.iter().enumerate().all(|(slot, c)| {
            c.kind != CellKind::Given
                || ((1..=n as i64).contains(&c.value) && puzzle.allows(slot, c.value))
        });
        let solved = consistent && fill(out, &mut placer, &board, &mut puzzle);
        placer.verdict(out, "sudoku", solved);
    })
}

/// Find a path from the top-left to the bottom-right corner, moving down,
/// left, right or up through open cells.
pub fn rat_in_maze(grid: &[Vec<i64>]) -> StepLog<BoardStep> {
    const MOVES: [(isize, isize); 4] = [(1, 0), (0, -1), (0, 1), (-1, 0)];

    fn walk(
        out: &mut impl Emit<BoardStep>,
        placer: &mut Placer,
        board: &Board,
        on_path: &mut [bool],
        at: (usize, usize),
    ) -> bool {
        if at == (board.rows - 1, board.cols - 1) {
            return true;
        }
        for (dr, dc) in MOVES {
            let (Some(row), Some(col)) = (at.0.checked_add_signed(dr), at.1.checked_add_signed(dc))
            else {
                continue;
            };
            let Some(cell) = board.at(row, col) else {
                continue;
            };
            let slot = board.slot(row, col);
            let ok = cell.kind == CellKind::Open && !on_path[slot];
            placer.check(
                out,
                cell,
                1,
                ok,
                match (cell.kind, on_path[slot]) {
                    (CellKind::Wall, _) => format!("({},{}) is a wall", row, col),
                    (_, true) => format!("({},{}) is already on the path", row, col),
                    _ => format!("Step to ({},{})", row, col),
                },
            );
            if !ok {
                continue;
            }
            placer.pick(out, cell, 1);
            on_path[slot] = true;
            if walk(out, placer, board, on_path, (row, col)) {
                return true;
            }
            on_path[slot] = false;
            placer.unpick(out, cell);
        }
        false
    }

    record("rat-in-maze", |out| {
        let board = Board::maze(grid);
        let mut placer = Placer::start(out, &board, "maze");
        let Some(start) = board.at(0, 0) else {
            placer.verdict(out, "rat-in-maze", false);
            return;
        };
        let open = start.kind == CellKind::Open;
        placer.check(
            out,
            start,
            1,
            open,
            if open {
                "Start in the top-left corner".to_string()
            } else {
                "The entrance is walled off".to_string()
            },
        );
        let mut solved = false;
        if open {
            placer.pick(out, start, 1);
            let mut on_path = vec![false; board.cells.len()];
            on_path[0] = true;
            solved = walk(out, &mut placer, &board, &mut on_path, (0, 0));
            if !solved {
                placer.unpick(out, start);
            }
        }
        placer.verdict(out, "rat-in-maze", solved);
    })
}
