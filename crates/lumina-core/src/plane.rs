//! Plane layouts derived from pixel format descriptors.
//!
//! Media libraries describe pixel formats as a list of components, each
//! living in some plane at some byte offset. The renderer needs the
//! opposite view: for every plane, which components it holds in memory
//! order, how many bits each occupies and how much padding sits between
//! them. [`plane_data_from_descriptor`] performs that conversion.
//!
//! Formats whose components are not byte-addressable are rejected:
//! big-endian, bitstream and palette formats, and descriptors without
//! components (hardware surfaces).
//!
//! # Usage
//!
//! ```rust
//! use lumina_core::{KnownFormat, KnownFormats, PixelFormatMapper};
//!
//! let planes = KnownFormats.plane_data(KnownFormat::Nv12).unwrap();
//! assert_eq!(planes.len(), 2);
//! assert_eq!(planes[1].components, 2);
//! assert_eq!(planes[1].component_map[..2], [1, 2]);
//! ```

use crate::{BitEncoding, Error, Result};

/// Maximum number of planes and of components per plane.
pub const MAX_PLANES: usize = 4;

/// Numeric type of the components in a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentType {
    /// Unsigned normalized integers.
    #[default]
    Unorm,
    /// Floating point.
    Float,
}

/// Format-wide flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelFormatFlags {
    /// Multi-byte components are stored big-endian.
    pub big_endian: bool,
    /// Components are packed at bit granularity.
    pub bitstream: bool,
    /// Values are indices into a palette.
    pub palette: bool,
    /// Components are floating point.
    pub float: bool,
}

/// One component of a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentDescriptor {
    /// Plane holding this component.
    pub plane: usize,
    /// Byte offset of the component inside a pixel.
    pub offset: u32,
    /// Bytes between two horizontally adjacent pixels.
    pub step: u32,
    /// Significant bits.
    pub depth: u32,
    /// Left shift of the significant bits.
    pub shift: u32,
}

/// Layout description of a pixel format, as published by media libraries.
///
/// Components are listed in channel order (e.g. Y, Cb, Cr, A or R, G, B, A).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelFormatDescriptor {
    /// Human readable name used in diagnostics.
    pub name: String,
    /// Format-wide flags.
    pub flags: PixelFormatFlags,
    /// Components in channel order.
    pub components: Vec<ComponentDescriptor>,
}

/// Memory layout of a single plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaneData {
    /// Numeric type of the components.
    pub component_type: ComponentType,
    /// Number of valid entries in the per-component arrays.
    pub components: usize,
    /// Bits occupied by each component, shift included.
    pub component_size: [u32; MAX_PLANES],
    /// Left shift of the significant bits of each component.
    pub component_shift: [u32; MAX_PLANES],
    /// Padding bits in front of each component.
    pub component_pad: [u32; MAX_PLANES],
    /// Channel index each component maps to.
    pub component_map: [usize; MAX_PLANES],
    /// Bytes per pixel in this plane.
    pub pixel_stride: u32,
}

impl PlaneData {
    /// Bit encoding of the first component.
    pub fn bit_encoding(&self) -> BitEncoding {
        let size = self.component_size[0];
        let shift = self.component_shift[0];
        BitEncoding {
            sample_depth: size,
            color_depth: size.saturating_sub(shift),
            bit_shift: shift,
        }
    }

    /// Channel indices held by this plane, in memory order.
    pub fn channels(&self) -> &[usize] {
        &self.component_map[..self.components]
    }
}

/// Converts a pixel format descriptor into per-plane layouts.
///
/// Components inside each plane are sorted by byte offset; padding is
/// the number of bits between the end of one component and the start of
/// the next.
pub fn plane_data_from_descriptor(desc: &PixelFormatDescriptor) -> Result<Vec<PlaneData>> {
    if desc.flags.big_endian {
        return Err(Error::unsupported_format(format!(
            "{}: big-endian formats are not supported",
            desc.name
        )));
    }
    if desc.flags.bitstream {
        return Err(Error::unsupported_format(format!(
            "{}: bitstream formats are not supported (components must be byte-aligned)",
            desc.name
        )));
    }
    if desc.flags.palette {
        return Err(Error::unsupported_format(format!(
            "{}: palette formats are not supported",
            desc.name
        )));
    }
    if desc.components.is_empty() {
        return Err(Error::unsupported_format(format!(
            "{}: descriptor has no components (hardware or virtual format?)",
            desc.name
        )));
    }
    if desc.components.len() > MAX_PLANES {
        return Err(Error::invalid_layout(format!(
            "{}: {} components",
            desc.name,
            desc.components.len()
        )));
    }

    let planes = desc.components.iter().map(|c| c.plane).max().unwrap_or(0) + 1;
    if planes > MAX_PLANES {
        return Err(Error::invalid_layout(format!("{}: {planes} planes", desc.name)));
    }

    let component_type = if desc.flags.float {
        ComponentType::Float
    } else {
        ComponentType::Unorm
    };

    let mut out = Vec::with_capacity(planes);
    for p in 0..planes {
        let mut members: Vec<usize> = (0..desc.components.len())
            .filter(|&c| desc.components[c].plane == p)
            .collect();
        members.sort_by_key(|&c| desc.components[c].offset);

        let mut data = PlaneData {
            component_type,
            components: members.len(),
            ..Default::default()
        };

        let mut bit_offset = 0u32;
        for (i, &c) in members.iter().enumerate() {
            let comp = &desc.components[c];
            let comp_offset = comp.offset * 8;
            if comp_offset < bit_offset {
                return Err(Error::invalid_layout(format!(
                    "{}: component {c} overlaps its predecessor",
                    desc.name
                )));
            }
            if i > 0 && data.pixel_stride != comp.step {
                return Err(Error::invalid_layout(format!(
                    "{}: components of plane {p} disagree on pixel stride",
                    desc.name
                )));
            }

            data.component_size[i] = comp.depth + comp.shift;
            data.component_shift[i] = comp.shift;
            data.component_map[i] = c;
            data.component_pad[i] = comp_offset - bit_offset;
            data.pixel_stride = comp.step;
            bit_offset = comp_offset + data.component_size[i];
        }

        out.push(data);
    }

    Ok(out)
}

/// Source of pixel format descriptors.
///
/// Implemented by integrations with external media libraries, which map
/// their own format identifiers onto [`PixelFormatDescriptor`]s.
pub trait PixelFormatMapper {
    /// External format identifier.
    type Format;

    /// Looks up the descriptor of a format, `None` if unknown.
    fn descriptor(&self, format: Self::Format) -> Option<PixelFormatDescriptor>;

    /// Looks up a format and converts it into plane layouts.
    fn plane_data(&self, format: Self::Format) -> Result<Vec<PlaneData>> {
        let desc = self
            .descriptor(format)
            .ok_or_else(|| Error::unsupported_format("unknown pixel format"))?;
        plane_data_from_descriptor(&desc)
    }
}

/// A handful of common formats, for tools and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFormat {
    /// Planar 8-bit YCbCr 4:2:0.
    Yuv420p,
    /// Planar 10-bit little-endian YCbCr 4:2:0.
    Yuv420p10,
    /// 8-bit luma plane plus interleaved CbCr plane.
    Nv12,
    /// 10-bit in the high bits of 16-bit words, luma plus interleaved CbCr.
    P010,
    /// Packed 8-bit RGBA.
    Rgba8,
    /// Packed 8-bit BGRA.
    Bgra8,
    /// Packed 16-bit big-endian RGB.
    Rgb48Be,
    /// 8-bit palette indices.
    Pal8,
    /// 1-bit monochrome.
    MonoBlack,
}

/// [`PixelFormatMapper`] over [`KnownFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownFormats;

impl PixelFormatMapper for KnownFormats {
    type Format = KnownFormat;

    fn descriptor(&self, format: KnownFormat) -> Option<PixelFormatDescriptor> {
        let comp = |plane, offset, step, depth, shift| ComponentDescriptor {
            plane,
            offset,
            step,
            depth,
            shift,
        };
        let (name, flags, components) = match format {
            KnownFormat::Yuv420p => (
                "yuv420p",
                PixelFormatFlags::default(),
                vec![comp(0, 0, 1, 8, 0), comp(1, 0, 1, 8, 0), comp(2, 0, 1, 8, 0)],
            ),
            KnownFormat::Yuv420p10 => (
                "yuv420p10le",
                PixelFormatFlags::default(),
                vec![comp(0, 0, 2, 10, 0), comp(1, 0, 2, 10, 0), comp(2, 0, 2, 10, 0)],
            ),
            KnownFormat::Nv12 => (
                "nv12",
                PixelFormatFlags::default(),
                vec![comp(0, 0, 1, 8, 0), comp(1, 0, 2, 8, 0), comp(1, 1, 2, 8, 0)],
            ),
            KnownFormat::P010 => (
                "p010le",
                PixelFormatFlags::default(),
                vec![comp(0, 0, 2, 10, 6), comp(1, 0, 4, 10, 6), comp(1, 2, 4, 10, 6)],
            ),
            KnownFormat::Rgba8 => (
                "rgba",
                PixelFormatFlags::default(),
                vec![
                    comp(0, 0, 4, 8, 0),
                    comp(0, 1, 4, 8, 0),
                    comp(0, 2, 4, 8, 0),
                    comp(0, 3, 4, 8, 0),
                ],
            ),
            KnownFormat::Bgra8 => (
                "bgra",
                PixelFormatFlags::default(),
                vec![
                    comp(0, 2, 4, 8, 0),
                    comp(0, 1, 4, 8, 0),
                    comp(0, 0, 4, 8, 0),
                    comp(0, 3, 4, 8, 0),
                ],
            ),
            KnownFormat::Rgb48Be => (
                "rgb48be",
                PixelFormatFlags {
                    big_endian: true,
                    ..Default::default()
                },
                vec![comp(0, 0, 6, 16, 0), comp(0, 2, 6, 16, 0), comp(0, 4, 6, 16, 0)],
            ),
            KnownFormat::Pal8 => (
                "pal8",
                PixelFormatFlags {
                    palette: true,
                    ..Default::default()
                },
                vec![comp(0, 0, 1, 8, 0)],
            ),
            KnownFormat::MonoBlack => (
                "monob",
                PixelFormatFlags {
                    bitstream: true,
                    ..Default::default()
                },
                vec![comp(0, 0, 1, 1, 0)],
            ),
        };
        Some(PixelFormatDescriptor {
            name: name.to_string(),
            flags,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_420() {
        let planes = KnownFormats.plane_data(KnownFormat::Yuv420p).unwrap();
        assert_eq!(planes.len(), 3);
        for (i, p) in planes.iter().enumerate() {
            assert_eq!(p.components, 1);
            assert_eq!(p.component_map[0], i);
            assert_eq!(p.component_size[0], 8);
            assert_eq!(p.pixel_stride, 1);
        }
    }

    #[test]
    fn test_bgra_sorted_by_offset() {
        let planes = KnownFormats.plane_data(KnownFormat::Bgra8).unwrap();
        assert_eq!(planes.len(), 1);
        assert_eq!(planes[0].channels(), &[2, 1, 0, 3]);
        assert_eq!(planes[0].component_pad, [0; 4]);
        assert_eq!(planes[0].pixel_stride, 4);
    }

    #[test]
    fn test_p010_shift_and_padding() {
        let planes = KnownFormats.plane_data(KnownFormat::P010).unwrap();
        let chroma = &planes[1];
        assert_eq!(chroma.component_size[..2], [16, 16]);
        assert_eq!(chroma.component_pad[..2], [0, 0]);
        assert_eq!(chroma.pixel_stride, 4);

        let bits = planes[0].bit_encoding();
        assert_eq!(bits.sample_depth, 16);
        assert_eq!(bits.color_depth, 10);
        assert_eq!(bits.bit_shift, 6);
    }

    #[test]
    fn test_padding_between_components() {
        // X2RGB-style: 8 bits of padding in front of every 8-bit channel
        let desc = PixelFormatDescriptor {
            name: "0rgb".into(),
            flags: PixelFormatFlags::default(),
            components: vec![
                ComponentDescriptor { plane: 0, offset: 1, step: 4, depth: 8, shift: 0 },
                ComponentDescriptor { plane: 0, offset: 2, step: 4, depth: 8, shift: 0 },
                ComponentDescriptor { plane: 0, offset: 3, step: 4, depth: 8, shift: 0 },
            ],
        };
        let planes = plane_data_from_descriptor(&desc).unwrap();
        assert_eq!(planes[0].component_pad[..3], [8, 0, 0]);
    }

    #[test]
    fn test_rejected_formats() {
        for fmt in [KnownFormat::Rgb48Be, KnownFormat::Pal8, KnownFormat::MonoBlack] {
            let err = KnownFormats.plane_data(fmt).unwrap_err();
            assert!(err.is_unsupported(), "{fmt:?}");
        }

        let empty = PixelFormatDescriptor {
            name: "vaapi".into(),
            ..Default::default()
        };
        assert!(plane_data_from_descriptor(&empty).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_stride_mismatch() {
        let desc = PixelFormatDescriptor {
            name: "broken".into(),
            flags: PixelFormatFlags::default(),
            components: vec![
                ComponentDescriptor { plane: 0, offset: 0, step: 2, depth: 8, shift: 0 },
                ComponentDescriptor { plane: 0, offset: 1, step: 3, depth: 8, shift: 0 },
            ],
        };
        assert!(plane_data_from_descriptor(&desc).is_err());
    }
}
