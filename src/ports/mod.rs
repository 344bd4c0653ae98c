pub mod point_history;
pub mod user_point;
