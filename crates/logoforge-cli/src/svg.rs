//! Thin SVG outline import
//!
//! Vector import proper is an external concern; this glue only lifts
//! `<path>` elements out of the artwork and understands the `M/L/H/V/C/Z`
//! subset of path data (plus relative variants), which covers exported
//! logo outlines. Artwork coordinates pass through unchanged: SVG x/y maps
//! onto the pipeline's ground plane as-is, so the top view matches the
//! artwork and the rasterized texture needs no flipping.

use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use anyhow::{Context, Result, bail};
use glam::Vec2;
use logoforge_core::path::{FillRule, PathCommand, RawOutline};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Read every `<path>` element of an SVG file as a raw outline.
pub fn import_outlines(path: &Path) -> Result<Vec<RawOutline>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut reader = Reader::from_str(&text);
    let mut outlines = Vec::new();

    loop {
        match reader.read_event().context("malformed SVG")? {
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == b"path" =>
            {
                let mut data = None;
                let mut fill = FillRule::NonZero;
                for attribute in element.attributes() {
                    let attribute = attribute.context("malformed SVG attribute")?;
                    match attribute.key.as_ref() {
                        b"d" => data = Some(attribute.unescape_value()?.into_owned()),
                        b"fill-rule" => {
                            if attribute.unescape_value()?.as_ref() == "evenodd" {
                                fill = FillRule::EvenOdd;
                            }
                        }
                        _ => {}
                    }
                }
                if let Some(data) = data {
                    let commands = parse_path_data(&data)
                        .with_context(|| format!("parsing path data {data:?}"))?;
                    if !commands.is_empty() {
                        outlines.push(RawOutline { commands, fill });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(outlines)
}

/// Parse the `M/L/H/V/C/Z` subset of SVG path data.
fn parse_path_data(data: &str) -> Result<Vec<PathCommand>> {
    let mut commands = Vec::new();
    let mut chars = data.chars().peekable();
    let mut pen = Vec2::ZERO;
    let mut start = Vec2::ZERO;
    let mut op: Option<char> = None;

    while let Some(&c) = chars.peek() {
        if is_separator(c) {
            chars.next();
            continue;
        }

        let current = if c.is_ascii_alphabetic() {
            chars.next();
            op = Some(c);
            c
        } else {
            // A bare number repeats the previous command.
            op.context("path data begins with a number")?
        };

        match current {
            'Z' | 'z' => {
                commands.push(PathCommand::Close);
                pen = start;
                op = None;
            }
            'M' | 'm' => {
                let p = parse_pair(&mut chars)?;
                pen = if current == 'm' { pen + p } else { p };
                start = pen;
                commands.push(PathCommand::MoveTo(pen));
                // Further coordinate pairs after a move are implicit lines.
                op = Some(if current == 'm' { 'l' } else { 'L' });
            }
            'L' | 'l' => {
                let p = parse_pair(&mut chars)?;
                pen = if current == 'l' { pen + p } else { p };
                commands.push(PathCommand::LineTo(pen));
            }
            'H' | 'h' => {
                let x = parse_number(&mut chars)?;
                pen.x = if current == 'h' { pen.x + x } else { x };
                commands.push(PathCommand::LineTo(pen));
            }
            'V' | 'v' => {
                let y = parse_number(&mut chars)?;
                pen.y = if current == 'v' { pen.y + y } else { y };
                commands.push(PathCommand::LineTo(pen));
            }
            'C' | 'c' => {
                let mut c1 = parse_pair(&mut chars)?;
                let mut c2 = parse_pair(&mut chars)?;
                let mut to = parse_pair(&mut chars)?;
                if current == 'c' {
                    c1 += pen;
                    c2 += pen;
                    to += pen;
                }
                commands.push(PathCommand::CurveTo { c1, c2, to });
                pen = to;
            }
            other => bail!("unsupported path command {other:?}"),
        }
    }

    Ok(commands)
}

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == ','
}

fn parse_pair(chars: &mut Peekable<Chars>) -> Result<Vec2> {
    let x = parse_number(chars)?;
    let y = parse_number(chars)?;
    Ok(Vec2::new(x, y))
}

fn parse_number(chars: &mut Peekable<Chars>) -> Result<f32> {
    while chars.next_if(|&c| is_separator(c)).is_some() {}

    let mut text = String::new();
    if let Some(sign) = chars.next_if(|&c| c == '+' || c == '-') {
        text.push(sign);
    }
    while let Some(digit) = chars.next_if(|&c| c.is_ascii_digit() || c == '.') {
        text.push(digit);
    }
    if let Some(exp) = chars.next_if(|&c| c == 'e' || c == 'E') {
        text.push(exp);
        if let Some(sign) = chars.next_if(|&c| c == '+' || c == '-') {
            text.push(sign);
        }
        while let Some(digit) = chars.next_if(|&c| c.is_ascii_digit()) {
            text.push(digit);
        }
    }

    text.parse::<f32>()
        .with_context(|| format!("invalid number {text:?} in path data"))
}
