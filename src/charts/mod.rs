//! Charts module - declarative sections, interactive plotting and PNG export

mod export;
mod plotter;
mod sections;

pub use export::ReportExporter;
pub use plotter::SectionPlotter;
pub use sections::{
    BoxSeries, Panel, PanelData, ScatterSeries, SectionBuilder, SectionContent, SectionId,
};
