//! UI components.

pub mod bubble_chart;
