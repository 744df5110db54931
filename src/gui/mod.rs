//! GUI module - application shell and widgets

mod app;
mod section_view;
mod sidebar;

pub use app::DashboardApp;
pub use section_view::SectionView;
pub use sidebar::{Sidebar, SidebarAction};
