// src/deck/render.rs

//! TOML rendering of converted deck files
//!
//! Output has up to three parts separated by blank lines: the `[meta]` table,
//! the `[decks]` table of plain decks, then one top-level table per special
//! deck. Empty parts other than `[meta]` are left out, as are empty metadata
//! fields except `title`.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;
use toml::value::{Date, Datetime, Offset, Time};
use toml_edit::{Array, DocumentMut, Item, Table, value};

use super::{DECKS_SECTION, Metadata, OutputDocument};
use crate::error::Result;

#[derive(Serialize)]
struct MetaSection<'a> {
    meta: MetaTable<'a>,
}

#[derive(Serialize)]
struct MetaTable<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    authors: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update_date: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    update_urls: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<&'a str>,
}

impl<'a> From<&'a Metadata> for MetaTable<'a> {
    fn from(meta: &'a Metadata) -> Self {
        Self {
            title: &meta.title,
            author: non_empty(&meta.author),
            authors: &meta.authors,
            version: non_empty(&meta.version),
            license: non_empty(&meta.license),
            date: meta.date.as_ref().and_then(toml_datetime),
            update_date: meta.update_date.as_ref().and_then(toml_datetime),
            desc: non_empty(&meta.desc),
            update_urls: &meta.update_urls,
            etag: non_empty(&meta.etag),
        }
    }
}

/// Render a converted deck file as TOML text
///
/// Special decks named like a section (`meta`, `decks`) would clash with
/// that section; the conversion pipeline removes them before rendering.
pub fn render_toml(doc: &OutputDocument) -> Result<String> {
    let mut out = toml::to_string_pretty(&MetaSection {
        meta: MetaTable::from(&doc.meta),
    })?;

    if !doc.decks.is_empty() {
        let mut decks = Table::new();
        for (name, options) in &doc.decks {
            decks.insert(name, value(options_array(options)));
        }
        let mut section = DocumentMut::new();
        section.insert(DECKS_SECTION, Item::Table(decks));

        out.push('\n');
        out.push_str(&section.to_string());
    }

    if !doc.special_decks.is_empty() {
        let mut section = DocumentMut::new();
        for (name, deck) in &doc.special_decks {
            let mut table = Table::new();
            table.insert("export", value(deck.export));
            table.insert("visible", value(deck.visible));
            table.insert("options", value(options_array(&deck.options)));
            section.insert(name, Item::Table(table));
        }

        out.push('\n');
        out.push_str(&section.to_string());
    }

    Ok(out)
}

/// Option list with one element per line
fn options_array(options: &[String]) -> Array {
    let mut array: Array = options.iter().map(String::as_str).collect();
    if !array.is_empty() {
        for item in array.iter_mut() {
            item.decor_mut().set_prefix("\n    ");
        }
        array.set_trailing_comma(true);
        array.set_trailing("\n");
    }
    array
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// TOML form of a date-time; `None` when TOML cannot hold it
fn toml_datetime(dt: &DateTime<FixedOffset>) -> Option<Datetime> {
    let minutes = i16::try_from(dt.offset().local_minus_utc() / 60).ok()?;
    let offset = if minutes == 0 {
        Offset::Z
    } else {
        Offset::Custom { minutes }
    };

    let year = u16::try_from(dt.year()).ok().filter(|y| *y <= 9999)?;
    if dt.nanosecond() >= 1_000_000_000 {
        return None;
    }

    Some(Datetime {
        date: Some(Date {
            year,
            month: u8::try_from(dt.month()).ok()?,
            day: u8::try_from(dt.day()).ok()?,
        }),
        time: Some(Time {
            hour: u8::try_from(dt.hour()).ok()?,
            minute: u8::try_from(dt.minute()).ok()?,
            second: u8::try_from(dt.second()).ok()?,
            nanosecond: dt.nanosecond(),
        }),
        offset: Some(offset),
    })
}
