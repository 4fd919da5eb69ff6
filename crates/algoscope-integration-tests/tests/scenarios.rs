//! End-to-end scenarios: generate, play back, serialize.

use algoscope_algos::array::{self, ArrayState, ArrayStep};
use algoscope_algos::backtrack::{self, BacktrackState};
use algoscope_algos::bits::{self, BitWidth, BitsStep};
use algoscope_algos::board::{self, BoardState, BoardStep};
use algoscope_algos::interval::{self, Interval, IntervalState};
use algoscope_algos::recursion::{self, RecursionState};
use algoscope_algos::window::{self, WindowState, WindowStep};
use algoscope_integration_tests::init_logging;
use algoscope_playback::{Playback, PlaybackConfig, PlaybackState};
use algoscope_trace::{reconstruct_final, Block, Id, Pointer, Step};

#[test]
fn bubble_sort_three_blocks() {
    init_logging();
    let blocks = vec![Block::new(1, 3), Block::new(2, 1), Block::new(3, 2)];
    let steps = array::bubble_sort(&blocks);
    let state: ArrayState = reconstruct_final(&steps);
    assert_eq!(state.values(), vec![1, 2, 3]);
    assert_eq!(state.order, vec![Id(2), Id(3), Id(1)]);
    assert!(state.highlight.is_none());
}

#[test]
fn two_sum_finds_pair_adding_to_five() {
    let blocks = Block::from_values(&[1, 2, 3, 4]);
    let steps = window::two_sum(&blocks, 5);
    let (ids, value) = steps
        .iter()
        .find_map(|s| match &s.kind {
            WindowStep::Found { ids, value } => Some((ids.clone(), *value)),
            _ => None,
        })
        .expect("a found step");
    assert_eq!(value, 5);
    let sum: i64 = ids
        .iter()
        .map(|id| blocks.iter().find(|b| b.id == *id).map(|b| b.value).unwrap_or(0))
        .sum();
    assert_eq!(sum, 5);
    assert!(reconstruct_final::<WindowState>(&steps).finished);
}

#[test]
fn seven_is_odd() {
    let steps = bits::check_odd_even(7, BitWidth::default());
    let update = steps
        .iter()
        .find(|s| matches!(s.kind, BitsStep::Update { .. }))
        .expect("an update step");
    assert!(update.explanation().contains("7 is odd"));
}

#[test]
fn scrub_backwards_through_a_sort() {
    init_logging();
    let steps = array::merge_sort(&Block::from_values(&[4, 1, 3, 9, 7, 2]));
    let config = PlaybackConfig {
        checkpoint_interval: 5,
        ..Default::default()
    };
    let mut playback = Playback::<ArrayState>::new(steps, &config).expect("non-empty log");
    playback.seek(usize::MAX);
    assert_eq!(playback.state(), PlaybackState::Finished);
    assert_eq!(playback.frame().state.values(), vec![1, 2, 3, 4, 7, 9]);

    let mut seen = Vec::new();
    while playback.current_index() > 0 {
        playback.step_backward();
        seen.push(playback.frame().state);
    }
    assert_eq!(seen.last().map(|s| s.values()), Some(vec![4, 1, 3, 9, 7, 2]));
    assert_eq!(playback.state(), PlaybackState::Paused);
}

#[test]
fn sudoku_final_frame_is_solved() {
    let grid = vec![
        vec![0, 0, 0, 4],
        vec![0, 4, 1, 0],
        vec![2, 0, 0, 3],
        vec![0, 3, 0, 0],
    ];
    let steps = board::sudoku(&grid);
    assert!(steps.iter().any(|s| matches!(s.kind, BoardStep::Solved)));
    let grid = reconstruct_final::<BoardState>(&steps).grid();
    for row in &grid {
        let mut sorted = row.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }
    for col in 0..4 {
        let mut column: Vec<i64> = grid.iter().map(|r| r[col]).collect();
        column.sort();
        assert_eq!(column, vec![1, 2, 3, 4]);
    }
}

#[test]
fn call_tree_survives_json_round_trip() {
    let steps = recursion::fibonacci_memo(6);
    let json = serde_json::to_string(&steps).expect("serialize");
    let back: Vec<Step<recursion::RecursionStep>> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, steps);
    let state: RecursionState = reconstruct_final(&back);
    assert_eq!(state.result, Some(8));
}

#[test]
fn step_json_shape() {
    let steps = array::bubble_sort(&Block::from_values(&[2, 1]));
    let json = serde_json::to_value(&steps[0]).expect("serialize");
    assert_eq!(json["type"], "init");
    assert_eq!(json["blocks"][0]["id"], 1);

    let compare = steps
        .iter()
        .find(|s| matches!(s.kind, ArrayStep::Compare { .. }))
        .expect("a compare step");
    let json = serde_json::to_value(compare).expect("serialize");
    assert_eq!(json["type"], "compare");
    assert!(json.get("lines").is_some());

    let annotated = Step::new(ArrayStep::Done).pointer(
        "window",
        Pointer::Annotated {
            ids: vec![Id(1), Id(2)],
            value: 3,
        },
    );
    let json = serde_json::to_value(&annotated).expect("serialize");
    assert_eq!(json["pointers"]["window"]["value"], 3);
}

#[test]
fn letters_and_intervals_read_naturally() {
    let state: BacktrackState = reconstruct_final(&backtrack::letter_combinations("7"));
    assert_eq!(state.solution_labels(), vec!["p", "q", "r", "s"]);

    let steps = interval::merge_intervals(&Interval::from_pairs(&[(1, 3), (2, 6), (8, 10), (15, 18)]));
    let state: IntervalState = reconstruct_final(&steps);
    assert_eq!(state.spans(), vec![(1, 6), (8, 10), (15, 18)]);
}
