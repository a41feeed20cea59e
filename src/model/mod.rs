pub mod candle;
pub mod observation;
