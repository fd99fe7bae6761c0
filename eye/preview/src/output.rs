//! Frame dump formatting
//!
//! ASCII dumps mirror what an OLED would show; JSON dumps emit one object per
//! line so they can be piped into other tools.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use roboteye_core::{
    render_ascii, write_ascii, AnimationCatalog, AnimationDescriptor, AnimationId,
    AnimatorSnapshot, FrameGeometry, SequenceStep, TickOutput, FRAME_GEOMETRY,
};

/// Output format for frame dumps
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `#`/`.` art, one block per frame
    Ascii,
    /// JSON Lines, one object per frame
    Json,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_ms: Option<u64>,
    animation: AnimationId,
    frame_index: usize,
    rows: Vec<String>,
    state: &'a AnimatorSnapshot,
}

#[derive(Serialize)]
struct CatalogRecord {
    animation: AnimationId,
    frames: usize,
    frame_duration_ms: u16,
    looping: bool,
    total_duration_ms: u64,
}

#[derive(Serialize)]
struct DescriptorFrameRecord {
    index: usize,
    duration_ms: u16,
    bitmap_offset: u32,
    rows: Vec<String>,
}

#[derive(Serialize)]
struct DescriptorRecord<'a> {
    name: &'a str,
    width: u16,
    height: u16,
    bytes_per_frame: u16,
    loop_count: u16,
    total_duration_ms: u64,
    frames: Vec<DescriptorFrameRecord>,
}

fn rows(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

/// Header printed when a phase starts (ASCII only)
pub fn write_phase_header<W: Write>(
    out: &mut W,
    format: Format,
    label: &str,
    bias: f32,
) -> io::Result<()> {
    match format {
        Format::Ascii => writeln!(out, "\n== Phase {label} (bias {bias:.2}) =="),
        Format::Json => Ok(()),
    }
}

/// One step of a scripted sequence
pub fn write_sequence_step<W: Write>(
    out: &mut W,
    format: Format,
    step: &SequenceStep,
) -> io::Result<()> {
    match format {
        Format::Ascii => {
            writeln!(out, "Frame {}", step.output.frame_index + 1)?;
            write_ascii(step.output.frame, FRAME_GEOMETRY, out)
        }
        Format::Json => write_json(
            out,
            &FrameRecord {
                phase: Some(&step.phase),
                step: Some(step.step),
                time_ms: None,
                animation: step.output.animation,
                frame_index: step.output.frame_index,
                rows: rows(&render_ascii(step.output.frame, FRAME_GEOMETRY)),
                state: &step.snapshot,
            },
        ),
    }
}

/// One tick of free-running playback
pub fn write_tick<W: Write>(
    out: &mut W,
    format: Format,
    time_ms: u64,
    output: &TickOutput,
    snapshot: &AnimatorSnapshot,
) -> io::Result<()> {
    match format {
        Format::Ascii => {
            writeln!(
                out,
                "t={time_ms}ms {} frame {}",
                output.animation,
                output.frame_index + 1
            )?;
            write_ascii(output.frame, FRAME_GEOMETRY, out)
        }
        Format::Json => write_json(
            out,
            &FrameRecord {
                phase: None,
                step: None,
                time_ms: Some(time_ms),
                animation: output.animation,
                frame_index: output.frame_index,
                rows: rows(&render_ascii(output.frame, FRAME_GEOMETRY)),
                state: snapshot,
            },
        ),
    }
}

/// Built-in animation table
pub fn write_catalog<W: Write>(
    out: &mut W,
    format: Format,
    catalog: &AnimationCatalog,
) -> io::Result<()> {
    for (id, def) in catalog.iter() {
        match format {
            Format::Ascii => writeln!(
                out,
                "{:<11} frames={} duration={}ms loop={} total={}ms",
                id.name(),
                def.frame_count(),
                def.frame_duration_ms,
                if def.looping { "yes" } else { "no" },
                def.total_duration_ms()
            )?,
            Format::Json => write_json(
                out,
                &CatalogRecord {
                    animation: id,
                    frames: def.frame_count(),
                    frame_duration_ms: def.frame_duration_ms,
                    looping: def.looping,
                    total_duration_ms: def.total_duration_ms(),
                },
            )?,
        }
    }
    Ok(())
}

/// Summary and frames of an imported descriptor
pub fn write_descriptor<W: Write>(
    out: &mut W,
    format: Format,
    descriptor: &AnimationDescriptor,
) -> io::Result<()> {
    let geometry: FrameGeometry = descriptor.geometry();

    match format {
        Format::Ascii => {
            writeln!(
                out,
                "{}: {}x{} px, {} frames, {} bytes/frame, {}ms total, loop_count={}",
                descriptor.name,
                descriptor.width,
                descriptor.height,
                descriptor.frames.len(),
                descriptor.bytes_per_frame,
                descriptor.total_duration_ms(),
                descriptor.loop_count
            )?;
            for (index, timing) in descriptor.frames.iter().enumerate() {
                writeln!(
                    out,
                    "\nFrame {} ({}ms @ offset {})",
                    index + 1,
                    timing.duration_ms,
                    timing.bitmap_offset
                )?;
                if let Some(frame) = descriptor.frame(index) {
                    write_ascii(frame, geometry, out)?;
                }
            }
            Ok(())
        }
        Format::Json => {
            let frames = descriptor
                .frames
                .iter()
                .enumerate()
                .map(|(index, timing)| DescriptorFrameRecord {
                    index,
                    duration_ms: timing.duration_ms,
                    bitmap_offset: timing.bitmap_offset,
                    rows: descriptor
                        .frame(index)
                        .map(|frame| rows(&render_ascii(frame, geometry)))
                        .unwrap_or_default(),
                })
                .collect();
            write_json(
                out,
                &DescriptorRecord {
                    name: &descriptor.name,
                    width: descriptor.width,
                    height: descriptor.height,
                    bytes_per_frame: descriptor.bytes_per_frame,
                    loop_count: descriptor.loop_count,
                    total_duration_ms: descriptor.total_duration_ms(),
                    frames,
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roboteye_core::{default_phases, run_sequence, sequence_animator};

    #[test]
    fn test_ascii_catalog_lists_every_animation() {
        let mut buf = Vec::new();
        write_catalog(&mut buf, Format::Ascii, AnimationCatalog::builtin()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("blink       frames=5 duration=45ms loop=no total=225ms"));
    }

    #[test]
    fn test_json_step_is_one_line() {
        let mut animator = sequence_animator();
        let steps = run_sequence(&mut animator, &default_phases()[..1], 40);

        let mut buf = Vec::new();
        write_sequence_step(&mut buf, Format::Json, &steps[0]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["phase"], "Idle");
        assert_eq!(value["animation"], "idle");
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(8));
    }

    #[test]
    fn test_ascii_step_numbers_frames_from_one() {
        let mut animator = sequence_animator();
        let steps = run_sequence(&mut animator, &default_phases()[..1], 40);

        let mut buf = Vec::new();
        write_sequence_step(&mut buf, Format::Ascii, &steps[4]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Frame 2\n"));
        assert_eq!(text.lines().count(), 10);
    }
}
