pub mod closure;
pub mod sales;
pub mod week;
