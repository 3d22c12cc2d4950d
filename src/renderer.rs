//! # Widget Rendering
//!
//! This module renders the widget's two text views to a terminal or to any
//! monochrome `embedded-graphics` draw target. The terminal forms back the
//! `salat-widget` binary (status-bar line and `--card`).
//!
//! [`draw_widget`] is library API for panel hosts (e-paper, OLED): the binary
//! drives no display hardware itself, so a host that owns a panel driver
//! implementing `DrawTarget<Color = BinaryColor>` calls it with a
//! [`WidgetView`] from [`Widget::tick`](crate::widget::Widget::tick).

use crate::widget::WidgetView;
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10, FONT_9X15},
        MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use std::io::{self, Write};

/// Heading shown above the prayer name.
pub const TITLE: &str = "Next prayer";

/// One-line form, e.g. `"Dhuhr 00:15:00"`, for status bars.
pub fn draw_line(view: &WidgetView) -> String {
    format!("{} {}", view.prayer_name, view.countdown)
}

/// Render the widget as a framed text card.
///
/// ```text
/// ┌─────────────┐
/// │ Next prayer │
/// │ Dhuhr       │
/// │ 00:15:00    │
/// └─────────────┘
/// ```
pub fn draw_ascii<W: Write>(view: &WidgetView, out: &mut W) -> io::Result<()> {
    let lines = [TITLE, view.prayer_name.as_str(), view.countdown.as_str()];
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let rule = "─".repeat(width + 2);

    writeln!(out, "┌{rule}┐")?;
    for line in lines {
        writeln!(out, "│ {line:<width$} │")?;
    }
    writeln!(out, "└{rule}┘")?;
    Ok(())
}

/// Render the widget onto a monochrome display, centred horizontally.
///
/// Layout from top: small title, large prayer name, medium countdown. Text
/// that doesn't fit the target is clipped by the target.
pub fn draw_widget<D>(view: &WidgetView, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let area = display.bounding_box();
    let center_x = area.top_left.x + area.size.width as i32 / 2;
    let top = area.top_left.y;

    let centered = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();

    let title_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let name_style = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
    let countdown_style = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);

    let mut y = top + 2;
    Text::with_text_style(TITLE, Point::new(center_x, y), title_style, centered).draw(display)?;
    y += FONT_6X10.character_size.height as i32 + 2;

    Text::with_text_style(&view.prayer_name, Point::new(center_x, y), name_style, centered)
        .draw(display)?;
    y += FONT_10X20.character_size.height as i32 + 2;

    Text::with_text_style(&view.countdown, Point::new(center_x, y), countdown_style, centered)
        .draw(display)?;

    Ok(())
}
