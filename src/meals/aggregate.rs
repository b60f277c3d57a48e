//! Daily totals and goal progress. Everything here is pure and total:
//! the inputs are records already fetched from the store.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::meals::repo_types::MealLog;

/// Upper bound of the advisory "healthy" daily calorie range.
pub const HEALTHY_CALORIE_CEILING: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Add for DailyTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
        }
    }
}

impl AddAssign for DailyTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for DailyTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Anything carrying calories and macros: stored meal logs, scanned food items.
pub trait Nutrients {
    fn nutrients(&self) -> DailyTotals;
}

impl Nutrients for MealLog {
    fn nutrients(&self) -> DailyTotals {
        DailyTotals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }
}

pub fn total_calories<'a, T, I>(records: I) -> f64
where
    T: Nutrients + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records.into_iter().map(|r| r.nutrients().calories).sum()
}

pub fn daily_totals<'a, T, I>(records: I) -> DailyTotals
where
    T: Nutrients + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records.into_iter().map(Nutrients::nutrients).sum()
}

/// Percentage of `goal` reached, rounded to the nearest integer with halves
/// going up (so -2.5 becomes -2). A zero goal yields 0.
pub fn progress_percent(consumed: f64, goal: f64) -> i64 {
    if goal == 0.0 {
        return 0;
    }
    (consumed / goal * 100.0 + 0.5).floor() as i64
}

/// Advisory only: values above the ceiling are still accepted by the store.
pub fn is_within_healthy_range(calories: f64) -> bool {
    (0.0..=HEALTHY_CALORIE_CEILING).contains(&calories)
}
