//! # fuelclean-render
//!
//! Rendering backend for fuelclean: serializes a pipeline result to an xlsx
//! workbook holding the cleaned data sheet and the summary sheet with its
//! pie chart.

pub mod excel;

pub use excel::ExcelWriter;
