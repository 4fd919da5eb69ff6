//! Bit-manipulation family.
//!
//! Operands live in a fixed-width register. Every operation result is
//! truncated to the register width, and a shift by `k` is `k` separate
//! single-position shifts.

use algoscope_trace::{reconstruct, record, Emit, Fold, Pointer, Step, StepLog, Terminal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Register width in bits, clamped to `1..=32`. Deserialized widths go
/// through the same clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct BitWidth(u8);

impl BitWidth {
    pub const MAX: u8 = 32;

    pub fn new(bits: u8) -> Self {
        Self(bits.clamp(1, Self::MAX))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// All-ones mask for this width.
    pub const fn mask(self) -> u32 {
        if self.0 >= 32 {
            u32::MAX
        } else {
            (1u32 << self.0) - 1
        }
    }
}

impl From<u8> for BitWidth {
    fn from(bits: u8) -> Self {
        Self::new(bits)
    }
}

impl From<BitWidth> for u8 {
    fn from(width: BitWidth) -> Self {
        width.0
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        Self(8)
    }
}

/// A value in a fixed-width register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bits {
    pub value: u32,
    pub width: BitWidth,
}

impl Bits {
    /// `value` truncated to `width`.
    pub fn new(value: u32, width: BitWidth) -> Self {
        Self {
            value: value & width.mask(),
            width,
        }
    }

    pub fn bit(&self, position: u32) -> bool {
        position < u32::from(self.width.get()) && (self.value >> position) & 1 == 1
    }

    /// Bits from most to least significant.
    pub fn to_vec(&self) -> Vec<bool> {
        (0..u32::from(self.width.get())).rev().map(|p| self.bit(p)).collect()
    }
}

impl std::fmt::Display for Bits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.value, width = usize::from(self.width.get()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BitOp {
    And,
    Or,
    Xor,
    Not,
    ShiftLeft,
    ShiftRight,
    SubtractOne,
}

impl std::fmt::Display for BitOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BitOp::And => "AND",
            BitOp::Or => "OR",
            BitOp::Xor => "XOR",
            BitOp::Not => "NOT",
            BitOp::ShiftLeft => "<<",
            BitOp::ShiftRight => ">>",
            BitOp::SubtractOne => "- 1",
        })
    }
}

/// Steps of the bits family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BitsStep {
    Init {
        operand: u32,
        mask: Option<u32>,
        width: BitWidth,
    },
    Operation { op: BitOp, result: u32 },
    /// The operand register takes a new value.
    Update { value: u32 },
    HighlightBits { positions: Vec<u32> },
    Done,
}

impl Terminal for BitsStep {
    fn is_terminal(&self) -> bool {
        matches!(self, BitsStep::Done)
    }
}

/// Visual state of the bits family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitsState {
    pub operand: Bits,
    pub mask: Option<Bits>,
    pub last_op: Option<BitOp>,
    pub result: Option<Bits>,
    /// Transient, like a highlight.
    pub highlighted: Vec<u32>,
    pub finished: bool,
}

impl Fold for BitsState {
    type Kind = BitsStep;

    fn apply(&mut self, step: &Step<BitsStep>) {
        self.highlighted.clear();
        let width = self.operand.width;
        match &step.kind {
            BitsStep::Init {
                operand,
                mask,
                width,
            } => {
                *self = Self::default();
                self.operand = Bits::new(*operand, *width);
                self.mask = mask.map(|m| Bits::new(m, *width));
            }
            BitsStep::Operation { op, result } => {
                self.last_op = Some(*op);
                self.result = Some(Bits::new(*result, width));
            }
            BitsStep::Update { value } => {
                self.operand = Bits::new(*value, width);
            }
            BitsStep::HighlightBits { positions } => {
                self.highlighted = positions.clone();
            }
            BitsStep::Done => self.finished = true,
        }
    }
}

/// Rebuild the bits state after `steps[index]`.
pub fn reconstruct_bits(steps: &[Step<BitsStep>], index: usize) -> BitsState {
    reconstruct(steps, index)
}

fn init(out: &mut impl Emit<BitsStep>, operand: Bits, mask: Option<u32>, text: String) {
    out.emit(
        Step::new(BitsStep::Init {
            operand: operand.value,
            mask: mask.map(|m| m & operand.width.mask()),
            width: operand.width,
        })
        .lines([1])
        .explain(text),
    );
}

fn operation(out: &mut impl Emit<BitsStep>, width: BitWidth, op: BitOp, result: u32, line: u32, text: String) -> u32 {
    let result = result & width.mask();
    out.emit(
        Step::new(BitsStep::Operation { op, result })
            .lines([line])
            .explain(text),
    );
    result
}

fn highlight(out: &mut impl Emit<BitsStep>, positions: Vec<u32>) {
    out.emit(Step::new(BitsStep::HighlightBits { positions }));
}

fn done(out: &mut impl Emit<BitsStep>, text: String) {
    out.emit(Step::new(BitsStep::Done).explain(text));
}

/// Validate `position` against the width, emitting the single-bit mask's
/// init. Returns the mask, or `None` after closing the log.
fn bit_mask(out: &mut impl Emit<BitsStep>, operand: Bits, position: u32, verb: &str) -> Option<u32> {
    let width = u32::from(operand.width.get());
    if position >= width {
        init(out, operand, None, format!("{} bit {} of {}", verb, position, operand));
        debug!(position, width, "bit position outside register");
        done(out, format!("Bit {} is outside a {}-bit register", position, width));
        return None;
    }
    let mask = 1u32 << position;
    init(
        out,
        operand,
        Some(mask),
        format!("{} bit {} of {} using mask 1 << {}", verb, position, operand, position),
    );
    highlight(out, vec![position]);
    Some(mask)
}

/// Parity from the lowest bit.
pub fn check_odd_even(value: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("check-odd-even", |out| {
        let operand = Bits::new(value, width);
        init(out, operand, Some(1), format!("Is {} odd or even?", operand.value));
        highlight(out, vec![0]);
        let low = operation(
            out,
            width,
            BitOp::And,
            operand.value & 1,
            2,
            format!("{} AND 1 keeps the lowest bit", operand),
        );
        let verdict = if low == 1 { "odd" } else { "even" };
        out.emit(
            Step::new(BitsStep::Update { value: low })
                .lines([3])
                .explain(format!("The lowest bit is {}, so {} is {}", low, operand.value, verdict)),
        );
        done(out, format!("{} is {}", operand.value, verdict));
    })
}

/// Kernighan's method: `n & (n - 1)` clears the lowest set bit.
pub fn count_set_bits(value: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("count-set-bits", |out| {
        let operand = Bits::new(value, width);
        init(out, operand, None, format!("Count the 1 bits in {}", operand));
        let mut n = operand.value;
        let mut count = 0;
        while n != 0 {
            highlight(out, vec![n.trailing_zeros()]);
            let less = operation(out, width, BitOp::SubtractOne, n.wrapping_sub(1), 2, format!("{} - 1", n));
            n = operation(out, width, BitOp::And, n & less, 3, "AND clears the lowest set bit".to_string());
            count += 1;
            out.emit(
                Step::new(BitsStep::Update { value: n })
                    .lines([4])
                    .explain(format!("{} bit{} counted", count, if count == 1 { "" } else { "s" }))
                    .pointer(
                        "count",
                        Pointer::Annotated {
                            ids: Vec::new(),
                            value: count,
                        },
                    ),
            );
        }
        done(out, format!("{} has {} set bits", operand.value, count));
    })
}

/// A power of two has exactly one set bit, so `n & (n - 1)` is zero.
pub fn is_power_of_two(value: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("is-power-of-two", |out| {
        let operand = Bits::new(value, width);
        init(out, operand, None, format!("Is {} a power of two?", operand.value));
        if operand.value == 0 {
            done(out, "0 is not a power of two".to_string());
            return;
        }
        let less = operation(
            out,
            width,
            BitOp::SubtractOne,
            operand.value - 1,
            2,
            format!("{} - 1 = {}", operand.value, operand.value - 1),
        );
        let cleared = operation(out, width, BitOp::And, operand.value & less, 3, "n AND (n - 1)".to_string());
        let answer = if cleared == 0 { "is" } else { "is not" };
        out.emit(
            Step::new(BitsStep::Update { value: cleared })
                .lines([4])
                .explain(format!("Result {}: {} {} a power of two", cleared, operand.value, answer)),
        );
        done(out, format!("{} {} a power of two", operand.value, answer));
    })
}

/// Turn one bit on with OR.
pub fn set_bit(value: u32, position: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("set-bit", |out| {
        let operand = Bits::new(value, width);
        let Some(mask) = bit_mask(out, operand, position, "Set") else {
            return;
        };
        let result = operation(out, width, BitOp::Or, operand.value | mask, 2, "OR with the mask".to_string());
        out.emit(Step::new(BitsStep::Update { value: result }).lines([3]));
        done(out, format!("Bit {} is now 1", position));
    })
}

/// Turn one bit off with AND NOT.
pub fn clear_bit(value: u32, position: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("clear-bit", |out| {
        let operand = Bits::new(value, width);
        let Some(mask) = bit_mask(out, operand, position, "Clear") else {
            return;
        };
        let inverted = operation(out, width, BitOp::Not, !mask, 2, "Invert the mask".to_string());
        let result = operation(
            out,
            width,
            BitOp::And,
            operand.value & inverted,
            3,
            "AND with the inverted mask".to_string(),
        );
        out.emit(Step::new(BitsStep::Update { value: result }).lines([4]));
        done(out, format!("Bit {} is now 0", position));
    })
}

/// Flip one bit with XOR.
pub fn toggle_bit(value: u32, position: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("toggle-bit", |out| {
        let operand = Bits::new(value, width);
        let Some(mask) = bit_mask(out, operand, position, "Toggle") else {
            return;
        };
        let result = operation(out, width, BitOp::Xor, operand.value ^ mask, 2, "XOR with the mask".to_string());
        out.emit(Step::new(BitsStep::Update { value: result }).lines([3]));
        done(out, format!("Bit {} is now {}", position, (result >> position) & 1));
    })
}

/// Read one bit with AND. The operand is left unchanged.
pub fn get_bit(value: u32, position: u32, width: BitWidth) -> StepLog<BitsStep> {
    record("get-bit", |out| {
        let operand = Bits::new(value, width);
        let Some(mask) = bit_mask(out, operand, position, "Read") else {
            return;
        };
        let result = operation(out, width, BitOp::And, operand.value & mask, 2, "AND with the mask".to_string());
        let bit = u32::from(result != 0);
        done(out, format!("Bit {} of {} is {}", position, operand.value, bit));
    })
}

fn shift(value: u32, k: u32, width: BitWidth, op: BitOp) -> StepLog<BitsStep> {
    let name = match op {
        BitOp::ShiftLeft => "shift-left",
        _ => "shift-right",
    };
    record(name, |out| {
        let operand = Bits::new(value, width);
        init(out, operand, None, format!("Shift {} by {} one position at a time", operand, k));
        // Past the width every bit has dropped off and the register stays 0.
        let shown = k.min(u32::from(width.get()));
        let mut current = operand.value;
        for i in 1..=shown {
            let next = match op {
                BitOp::ShiftLeft => current << 1,
                _ => current >> 1,
            };
            current = operation(out, width, op, next, 2, format!("Shift {} of {}", i, k));
            out.emit(Step::new(BitsStep::Update { value: current }).lines([3]));
        }
        if shown < k {
            debug!(k, shown, "shift count capped at register width");
            done(
                out,
                format!(
                    "{} {} {} = {}: after {} shifts no bits are left",
                    operand.value, op, k, current, shown
                ),
            );
        } else {
            done(out, format!("{} {} {} = {}", operand.value, op, k, current));
        }
    })
}

/// `value << k` as `k` single shifts; bits pushed past the width drop off.
pub fn shift_left(value: u32, k: u32, width: BitWidth) -> StepLog<BitsStep> {
    shift(value, k, width, BitOp::ShiftLeft)
}

/// `value >> k` as `k` single shifts.
pub fn shift_right(value: u32, k: u32, width: BitWidth) -> StepLog<BitsStep> {
    shift(value, k, width, BitOp::ShiftRight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_trace::{reconstruct_final, validate_terminal};

    fn w8() -> BitWidth {
        BitWidth::default()
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(BitWidth::new(0).get(), 1);
        assert_eq!(BitWidth::new(40).get(), 32);
        assert_eq!(BitWidth::new(32).mask(), u32::MAX);
        assert_eq!(w8().mask(), 0xff);
        assert_eq!(Bits::new(0x1ff, w8()).value, 0xff);
        assert_eq!(Bits::new(5, BitWidth::new(4)).to_string(), "0101");
    }

    #[test]
    fn seven_is_odd() {
        let steps = check_odd_even(7, w8());
        assert!(validate_terminal(&steps).is_ok());
        let update = steps
            .iter()
            .find(|s| matches!(s.kind, BitsStep::Update { .. }))
            .unwrap();
        assert!(update.explanation().contains("7 is odd"));
        let state: BitsState = reconstruct_final(&steps);
        assert_eq!(state.operand.value, 1);
        assert!(state.highlighted.is_empty());
    }

    #[test]
    fn kernighan_count() {
        let steps = count_set_bits(0b1011_0010, w8());
        let updates = steps
            .iter()
            .filter(|s| matches!(s.kind, BitsStep::Update { .. }))
            .count();
        assert_eq!(updates, 4);
        assert_eq!(reconstruct_final::<BitsState>(&steps).operand.value, 0);
    }

    #[test]
    fn powers_of_two() {
        assert!(is_power_of_two(64, w8()).last().unwrap().explanation().contains("64 is a power"));
        assert!(is_power_of_two(6, w8()).last().unwrap().explanation().contains("is not"));
        assert_eq!(is_power_of_two(0, w8()).len(), 2);
    }

    #[test]
    fn single_bit_edits() {
        let value = |steps: &[Step<BitsStep>]| reconstruct_final::<BitsState>(steps).operand.value;
        assert_eq!(value(&set_bit(0b0101, 1, w8())), 0b0111);
        assert_eq!(value(&clear_bit(0b0111, 0, w8())), 0b0110);
        assert_eq!(value(&toggle_bit(0b0110, 3, w8())), 0b1110);
        let read = get_bit(0b0100, 2, w8());
        assert_eq!(reconstruct_final::<BitsState>(&read).result.map(|b| b.value), Some(0b0100));
        assert!(read.last().unwrap().explanation().ends_with("is 1"));
    }

    #[test]
    fn out_of_range_position() {
        let steps = set_bit(1, 9, w8());
        assert_eq!(steps.len(), 2);
        assert!(validate_terminal(&steps).is_ok());
        assert_eq!(reconstruct_final::<BitsState>(&steps).operand.value, 1);
        assert!(steps[1].explanation().contains("outside a 8-bit register"));
    }

    #[test]
    fn deserialized_width_is_clamped() {
        let step: Step<BitsStep> =
            serde_json::from_str(r#"{"type":"init","operand":1,"mask":null,"width":40}"#).unwrap();
        let state = reconstruct_final::<BitsState>(&[step]);
        assert_eq!(state.operand.width.get(), 32);
        assert_eq!(state.operand.to_vec().len(), 32);

        let width: BitWidth = serde_json::from_str("0").unwrap();
        assert_eq!(width.get(), 1);
        assert_eq!(serde_json::to_string(&BitWidth::new(12)).unwrap(), "12");
    }

    #[test]
    fn huge_shift_stops_at_the_width() {
        let steps = shift_left(1, u32::MAX, w8());
        let shifts = steps
            .iter()
            .filter(|s| matches!(s.kind, BitsStep::Operation { .. }))
            .count();
        assert_eq!(shifts, 8);
        assert!(validate_terminal(&steps).is_ok());
        assert_eq!(reconstruct_final::<BitsState>(&steps).operand.value, 0);
        assert!(steps[steps.len() - 1].explanation().contains("no bits are left"));

        let steps = shift_right(0xff, 1_000, BitWidth::new(4));
        assert_eq!(reconstruct_final::<BitsState>(&steps).operand.value, 0);
    }

    #[test]
    fn shifts_are_one_position_per_step() {
        let steps = shift_left(0b0000_0011, 3, w8());
        let ops: Vec<u32> = steps
            .iter()
            .filter_map(|s| match s.kind {
                BitsStep::Operation { result, .. } => Some(result),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec![0b0000_0110, 0b0000_1100, 0b0001_1000]);

        let dropped = shift_left(0b1100_0000, 2, w8());
        assert_eq!(reconstruct_final::<BitsState>(&dropped).operand.value, 0);
        let right = shift_right(0b1000, 3, w8());
        assert_eq!(reconstruct_final::<BitsState>(&right).operand.value, 1);
    }
}
