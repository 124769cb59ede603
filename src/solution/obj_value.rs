// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::fmt;

/// The value of an assignment, broken down by cost component. The same
/// record describes the delta of a prospective move, in which case the
/// fields compose by pointwise addition.
///
/// Only `total` participates in the ordering of solutions; the breakdown is
/// retained for diagnostics. Invariant: `total` is always the sum of the
/// five components.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ObjValue {
    load: i64,
    balance: i64,
    process_move: i64,
    service_move: i64,
    machine_move: i64,

    total: i64,
}

impl ObjValue {
    pub fn new(
        load: i64,
        balance: i64,
        process_move: i64,
        service_move: i64,
        machine_move: i64,
    ) -> ObjValue {
        ObjValue {
            load,
            balance,
            process_move,
            service_move,
            machine_move,
            total: load + balance + process_move + service_move + machine_move,
        }
    }

    /// The all-zero value. As a delta, it denotes a no-op move.
    pub fn zero() -> ObjValue {
        ObjValue::default()
    }

    /// Adds the given delta, componentwise, to this value.
    pub fn apply_delta(&mut self, delta: &ObjValue) {
        self.load += delta.load;
        self.balance += delta.balance;
        self.process_move += delta.process_move;
        self.service_move += delta.service_move;
        self.machine_move += delta.machine_move;
        self.total += delta.total;
    }

    pub fn load(&self) -> i64 {
        self.load
    }
    pub fn balance(&self) -> i64 {
        self.balance
    }
    pub fn process_move(&self) -> i64 {
        self.process_move
    }
    pub fn service_move(&self) -> i64 {
        self.service_move
    }
    pub fn machine_move(&self) -> i64 {
        self.machine_move
    }
    pub fn total(&self) -> i64 {
        self.total
    }
}

impl fmt::Display for ObjValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}; {}; {}; {}; {})",
            self.load, self.balance, self.process_move, self.service_move, self.machine_move
        )
    }
}

#[cfg(test)]
mod test_obj_value {
    use crate::solution::obj_value::ObjValue;

    #[test]
    fn total_is_the_sum_of_the_components() {
        let value = ObjValue::new(1, 2, 3, 4, 5);
        assert_eq!(15, value.total());
    }

    #[test]
    fn zero_is_all_zeroes() {
        assert_eq!(ObjValue::new(0, 0, 0, 0, 0), ObjValue::zero());
        assert_eq!(0, ObjValue::zero().total());
    }

    #[test]
    fn deltas_compose_by_pointwise_addition() {
        let mut value = ObjValue::new(10, 0, 5, 0, 0);
        value.apply_delta(&ObjValue::new(-3, 2, 0, 1, 0));
        assert_eq!(ObjValue::new(7, 2, 5, 1, 0), value);
        assert_eq!(15, value.total());
    }

    #[test]
    fn a_delta_and_its_opposite_cancel_out() {
        let mut value = ObjValue::new(4, 4, 4, 4, 4);
        let before = value;
        value.apply_delta(&ObjValue::new(1, -2, 3, 0, -1));
        value.apply_delta(&ObjValue::new(-1, 2, -3, 0, 1));
        assert_eq!(before, value);
    }
}
