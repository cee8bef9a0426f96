//! 依計量單位精度比較數量

use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

use crate::{PackError, Result};

/// 依精度四捨五入（遠離零）
pub fn float_round(value: Decimal, rounding: Decimal) -> Result<Decimal> {
    if rounding <= Decimal::ZERO {
        return Err(PackError::InvalidRounding(rounding));
    }
    let steps = value
        .checked_div(rounding)
        .ok_or(PackError::Overflow { value, rounding })?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    steps
        .checked_mul(rounding)
        .ok_or(PackError::Overflow { value, rounding })
}

/// 在指定精度下是否為零
pub fn float_is_zero(value: Decimal, rounding: Decimal) -> Result<bool> {
    Ok(float_round(value, rounding)?.is_zero())
}

/// 在指定精度下比較兩個數量
pub fn float_compare(a: Decimal, b: Decimal, rounding: Decimal) -> Result<Ordering> {
    let delta = float_round(a, rounding)?
        .checked_sub(float_round(b, rounding)?)
        .ok_or(PackError::Overflow { value: a, rounding })?;
    if float_is_zero(delta, rounding)? {
        return Ok(Ordering::Equal);
    }
    Ok(delta.cmp(&Decimal::ZERO))
}
