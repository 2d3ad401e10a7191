pub mod chart;
pub mod export;
pub mod layout;
pub mod plot_transform;
