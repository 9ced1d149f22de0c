//! Custom widgets shared by the rendering modules

pub mod temp_chart;
