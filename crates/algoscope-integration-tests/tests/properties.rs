//! Property tests over randomly generated inputs.

use std::collections::BTreeSet;

use algoscope_algos::array::{self, ArrayState, ArrayStep};
use algoscope_algos::backtrack::{self, BacktrackState};
use algoscope_algos::bits::{self, BitWidth, BitsState};
use algoscope_algos::board::{self, BoardOutcome, BoardState};
use algoscope_algos::graph::{self, Graph, GraphState, GraphStep};
use algoscope_algos::interval::{self, Interval, IntervalState};
use algoscope_algos::list::{self, LinkedList, ListState, ListStep};
use algoscope_algos::recursion::{self, RecursionState};
use algoscope_algos::window::{self, WindowState, WindowStep};
use algoscope_integration_tests::{assert_deterministic, assert_no_aliasing};
use algoscope_trace::{
    reconstruct, reconstruct_final, validate_balance, validate_references, validate_terminal, Block,
    Id, Step, StepLog,
};
use proptest::prelude::*;

fn values() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-50i64..50, 0..16)
}

fn sorters() -> [(&'static str, fn(&[Block]) -> StepLog<ArrayStep>); 5] {
    [
        ("bubble", array::bubble_sort),
        ("selection", array::selection_sort),
        ("insertion", array::insertion_sort),
        ("merge", array::merge_sort),
        ("quick", array::quick_sort),
    ]
}

fn assert_window_valid(steps: &[Step<WindowStep>], n: usize) {
    for index in 0..steps.len() {
        let state: WindowState = reconstruct(steps, index);
        assert!(state.window.len <= n, "index {} len {}", index, state.window.len);
        // start <= end + 1, with end = start + len - 1
        assert!(state.window.end_exclusive() <= n, "index {}", index);
    }
}

proptest! {
    #[test]
    fn reconstruction_is_deterministic(input in values()) {
        let steps = array::bubble_sort(&Block::from_values(&input));
        assert_deterministic::<ArrayState>(&steps);
    }

    #[test]
    fn descending_seeks_do_not_alias(input in values()) {
        let blocks = Block::from_values(&input);
        assert_no_aliasing::<ArrayState>(&array::quick_sort(&blocks));
        assert_no_aliasing::<WindowState>(&window::two_sum(&blocks, 7));
    }

    #[test]
    fn every_family_replays_the_same_way(
        input in prop::collection::vec(0i64..9, 0..5),
        n in 0i64..10,
        edges in prop::collection::vec((1u64..7, 1u64..7), 0..10),
        value in any::<u32>(),
        width in 1u8..=32,
    ) {
        let blocks = Block::from_values(&input);
        let pairs: Vec<(i64, i64)> = input.iter().map(|&v| (v, v + 2)).collect();

        let backtrack_log = backtrack::permutations(&blocks);
        assert_deterministic::<BacktrackState>(&backtrack_log);
        assert_no_aliasing::<BacktrackState>(&backtrack_log);

        let board_log = board::n_queens(input.len());
        assert_deterministic::<BoardState>(&board_log);
        assert_no_aliasing::<BoardState>(&board_log);

        let recursion_log = recursion::fibonacci_memo(n);
        assert_deterministic::<RecursionState>(&recursion_log);
        assert_no_aliasing::<RecursionState>(&recursion_log);

        let graph_log = graph::topological_sort(&Graph::directed(6, &edges));
        assert_deterministic::<GraphState>(&graph_log);
        assert_no_aliasing::<GraphState>(&graph_log);

        let list_log = list::reverse(&LinkedList::from_values(&input));
        assert_deterministic::<ListState>(&list_log);
        assert_no_aliasing::<ListState>(&list_log);

        let interval_log = interval::merge_intervals(&Interval::from_pairs(&pairs));
        assert_deterministic::<IntervalState>(&interval_log);
        assert_no_aliasing::<IntervalState>(&interval_log);

        let bits_log = bits::count_set_bits(value, BitWidth::new(width));
        assert_deterministic::<BitsState>(&bits_log);
        assert_no_aliasing::<BitsState>(&bits_log);

        let window_log = window::longest_distinct_window(&blocks);
        assert_deterministic::<WindowState>(&window_log);
    }

    #[test]
    fn sorters_end_sorted(input in values()) {
        let blocks = Block::from_values(&input);
        let ids: BTreeSet<Id> = blocks.iter().map(|b| b.id).collect();
        let mut expected = input.clone();
        expected.sort();
        for (name, sort) in sorters() {
            let steps = sort(&blocks);
            prop_assert!(validate_terminal(&steps).is_ok(), "{}", name);
            prop_assert!(validate_references::<ArrayState>(&steps).is_ok(), "{}", name);
            let state: ArrayState = reconstruct_final(&steps);
            prop_assert!(state.highlight.is_none(), "{}", name);
            prop_assert_eq!(&state.values(), &expected, "{}", name);
            let placed: BTreeSet<Id> = state.order.iter().copied().collect();
            prop_assert_eq!(&placed, &ids, "{}", name);
            prop_assert_eq!(state.order.len(), blocks.len(), "{}", name);
        }
    }

    #[test]
    fn subsets_and_permutations_balance(input in prop::collection::vec(0i64..9, 0..5)) {
        let items = Block::from_values(&input);
        for steps in [backtrack::subsets(&items), backtrack::permutations(&items)] {
            prop_assert_eq!(validate_balance(&steps, false), Ok(Vec::new()));
            prop_assert!(validate_references::<BacktrackState>(&steps).is_ok());
        }
    }

    #[test]
    fn combination_sum_solutions_add_up(
        input in prop::collection::vec(1i64..8, 1..5),
        target in 0i64..15,
    ) {
        let steps = backtrack::combination_sum(&Block::from_values(&input), target);
        prop_assert_eq!(validate_balance(&steps, false), Ok(Vec::new()));
        let state: BacktrackState = reconstruct_final(&steps);
        for solution in state.solution_values() {
            prop_assert_eq!(solution.iter().sum::<i64>(), target);
        }
    }

    #[test]
    fn queens_leave_only_the_solution_open(n in 1usize..7) {
        let steps = board::n_queens(n);
        let open = validate_balance(&steps, true).unwrap();
        let state: BoardState = reconstruct_final(&steps);
        match state.outcome {
            Some(BoardOutcome::Solved) => {
                prop_assert_eq!(open.len(), n);
            }
            _ => {
                prop_assert!(open.is_empty());
            }
        }
        prop_assert_eq!(state.outcome == Some(BoardOutcome::Solved), n != 2 && n != 3);
    }

    #[test]
    fn cycle_reported_iff_present(
        input in prop::collection::vec(0i64..100, 1..20),
        entry in prop::option::of(0usize..20),
    ) {
        let list = match entry {
            Some(k) if k < input.len() => LinkedList::with_cycle(&input, k),
            _ => LinkedList::from_values(&input),
        };
        let steps = list::detect_cycle(&list);
        prop_assert!(validate_terminal(&steps).is_ok());
        let state: ListState = reconstruct_final(&steps);
        prop_assert_eq!(state.cycle_meet.is_some(), list.has_cycle());

        let end = steps
            .iter()
            .position(|s| matches!(s.kind, ListStep::CycleFound { .. } | ListStep::NotFound))
            .unwrap_or(steps.len());
        let fast_hops = steps[..end]
            .iter()
            .filter(|s| matches!(&s.kind, ListStep::Advance { pointer, .. } if pointer == "fast"))
            .count()
            .saturating_sub(1);
        prop_assert!(fast_hops <= 2 * input.len());
    }

    #[test]
    fn merge_is_idempotent(pairs in prop::collection::vec((0i64..40, 0i64..40), 0..12)) {
        let first: IntervalState = reconstruct_final(&interval::merge_intervals(&Interval::from_pairs(&pairs)));
        let again: IntervalState =
            reconstruct_final(&interval::merge_intervals(&Interval::from_pairs(&first.spans())));
        prop_assert_eq!(first.spans(), again.spans());
        for pair in first.spans().windows(2) {
            prop_assert!(pair[0].1 < pair[1].0);
        }
    }

    #[test]
    fn windows_stay_inside_the_array(
        input in prop::collection::vec(0i64..20, 0..16),
        k in 0usize..20,
        target in 0i64..60,
    ) {
        let blocks = Block::from_values(&input);
        for steps in [
            window::max_sum_window(&blocks, k),
            window::min_length_window(&blocks, target),
            window::longest_distinct_window(&blocks),
        ] {
            assert_window_valid(&steps, input.len());
            let verdict = &steps[steps.len() - 2].kind;
            prop_assert!(
                matches!(verdict, WindowStep::Found { .. } | WindowStep::NotFound),
                "window log ends with {:?}",
                verdict
            );
        }
    }

    #[test]
    fn traversals_visit_each_reached_node_once(
        n in 1u64..9,
        edges in prop::collection::vec((1u64..9, 1u64..9), 0..16),
    ) {
        let graph = Graph::undirected(n, &edges);
        for steps in [graph::bfs(&graph, Id(1)), graph::dfs(&graph, Id(1))] {
            prop_assert!(validate_references::<GraphState>(&steps).is_ok());
            let visits: Vec<Id> = steps
                .iter()
                .filter_map(|s| match s.kind {
                    GraphStep::VisitNode { id, .. } => Some(id),
                    _ => None,
                })
                .collect();
            let unique: BTreeSet<Id> = visits.iter().copied().collect();
            prop_assert_eq!(unique.len(), visits.len());
        }
        let bfs_reached: BTreeSet<Id> =
            reconstruct_final::<GraphState>(&graph::bfs(&graph, Id(1))).depth.into_keys().collect();
        let dfs_reached: BTreeSet<Id> =
            reconstruct_final::<GraphState>(&graph::dfs(&graph, Id(1))).depth.into_keys().collect();
        prop_assert_eq!(bfs_reached, dfs_reached);
    }
}
