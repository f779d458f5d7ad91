pub mod polyline;
pub mod projection;
