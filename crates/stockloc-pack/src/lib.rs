//! # Stockloc Pack
//!
//! 出貨單「裝箱」操作：有待裝箱的明細時改為開啟多箱裝箱精靈

pub mod pack;
pub mod picking;
pub mod rounding;

// Re-export 主要類型
pub use pack::{
    packable_lines, put_in_pack, DestinationCheck, MultiPackWizard, NoDestinationCheck,
    PackDecision, MULTI_PACK_WIZARD,
};
pub use picking::{MoveLine, Picking};
pub use rounding::{float_compare, float_is_zero, float_round};

/// 裝箱錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    #[error("無效的計量單位精度: {0}")]
    InvalidRounding(rust_decimal::Decimal),

    #[error("數量 {value} 依精度 {rounding} 計算時溢位")]
    Overflow {
        value: rust_decimal::Decimal,
        rounding: rust_decimal::Decimal,
    },
}

pub type Result<T> = std::result::Result<T, PackError>;
