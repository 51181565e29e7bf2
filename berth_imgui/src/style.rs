// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metrics and colors used by the built-in widgets.

use crate::Color;

/// Palette for built-in widgets and dock chrome.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(missing_docs, reason = "Field names describe the painted element.")]
pub struct Colors {
    pub text: Color,
    pub background: Color,
    pub button: Color,
    pub button_hover: Color,
    pub button_active: Color,
    pub scroll_track: Color,
    pub scroll_thumb: Color,
    pub border: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            text: Color::rgba(230, 230, 230, 255),
            background: Color::rgba(40, 40, 44, 255),
            button: Color::rgba(70, 70, 78, 255),
            button_hover: Color::rgba(90, 90, 100, 255),
            button_active: Color::rgba(110, 110, 124, 255),
            scroll_track: Color::rgba(30, 30, 34, 255),
            scroll_thumb: Color::rgba(80, 80, 90, 255),
            border: Color::rgba(25, 25, 25, 255),
        }
    }
}

/// Layout metrics in logical units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    /// Inset between a region's edge and its content.
    pub padding: f64,
    /// Gap between consecutive cells.
    pub spacing: f64,
    /// Height used by [`crate::Extent::Auto`] rows.
    pub row_height: f64,
    /// Width used by [`crate::Extent::Auto`] cells.
    pub cell_width: f64,
    /// Thickness of region scrollbars.
    pub scrollbar_size: f64,
    /// Smallest scrollbar thumb length.
    pub thumb_min: f64,
    /// Distance scrolled per wheel notch.
    pub wheel_step: f64,
    /// Palette.
    pub colors: Colors,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            padding: 4.0,
            spacing: 4.0,
            row_height: 20.0,
            cell_width: 80.0,
            scrollbar_size: 10.0,
            thumb_min: 8.0,
            wheel_step: 30.0,
            colors: Colors::default(),
        }
    }
}
