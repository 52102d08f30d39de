//! Export of drawable collections as VTK PolyData (`.vtp`).
//!
//! Every collection becomes one `Piece`. The cross-section plane is written as the
//! x-y plane of the file: x is the station, y the elevation and z is always zero.
//! Patches are written as polygons, polylines and arrows as lines, points as
//! vertices. Patch values and arrow vectors are attached as cell data.

use crate::prelude::*;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

/// the encoding to use when writing an inline dataarray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Base64,
}

impl Encoding {
    fn to_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }
}

/// Write `collections` to `writer` as a single PolyData file.
pub fn write_vtp<W: Write>(
    writer: W,
    collections: &[Collection],
    encoding: Encoding,
) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let vtk_file = BytesStart::new("VTKFile").with_attributes([
        ("type", "PolyData"),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ]);
    writer.write_event(Event::Start(vtk_file))?;
    writer.write_event(Event::Start(BytesStart::new("PolyData")))?;

    for collection in collections {
        let piece = Piece::from(collection);
        piece.write(&mut writer, encoding)?;
    }

    writer.write_event(Event::End(BytesEnd::new("PolyData")))?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    log::debug!("wrote {} collections as PolyData", collections.len());

    Ok(())
}

/// which PolyData topology section the cells of a piece go to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topology {
    Verts,
    Lines,
    Polys,
}

impl Topology {
    fn element(self) -> &'static str {
        match self {
            Self::Verts => "Verts",
            Self::Lines => "Lines",
            Self::Polys => "Polys",
        }
    }
}

struct CellArray {
    name: &'static str,
    components: usize,
    values: Vec<f64>,
}

/// flattened geometry of one collection
struct Piece {
    topology: Topology,
    points: Vec<f64>,
    connectivity: Vec<i64>,
    offsets: Vec<i64>,
    cell_data: Option<CellArray>,
}

impl Piece {
    fn new(topology: Topology) -> Self {
        Self {
            topology,
            points: Vec::new(),
            connectivity: Vec::new(),
            offsets: Vec::new(),
            cell_data: None,
        }
    }

    fn num_points(&self) -> usize {
        self.points.len() / 3
    }

    /// append one cell made of `vertices`
    fn push_cell(&mut self, vertices: &[Point]) {
        for vertex in vertices {
            self.connectivity.push(self.num_points() as i64);
            self.points.extend_from_slice(&[vertex[0], vertex[1], 0.0]);
        }
        self.offsets.push(self.connectivity.len() as i64);
    }

    fn write<W: Write>(&self, writer: &mut Writer<W>, encoding: Encoding) -> Result<(), Error> {
        let num_points = self.num_points().to_string();
        let num_cells = self.offsets.len().to_string();

        let count = |topology: Topology| {
            if self.topology == topology {
                num_cells.as_str()
            } else {
                "0"
            }
        };

        let piece = BytesStart::new("Piece").with_attributes([
            ("NumberOfPoints", num_points.as_str()),
            ("NumberOfVerts", count(Topology::Verts)),
            ("NumberOfLines", count(Topology::Lines)),
            ("NumberOfStrips", "0"),
            ("NumberOfPolys", count(Topology::Polys)),
        ]);
        writer.write_event(Event::Start(piece))?;

        writer.write_event(Event::Start(BytesStart::new("Points")))?;
        write_inline_dataarray(writer, &self.points, None, 3, encoding)?;
        writer.write_event(Event::End(BytesEnd::new("Points")))?;

        if let Some(cell_data) = &self.cell_data {
            let start = BytesStart::new("CellData").with_attributes([("Scalars", cell_data.name)]);
            writer.write_event(Event::Start(start))?;
            write_inline_dataarray(
                writer,
                &cell_data.values,
                Some(cell_data.name),
                cell_data.components,
                encoding,
            )?;
            writer.write_event(Event::End(BytesEnd::new("CellData")))?;
        }

        let element = self.topology.element();
        writer.write_event(Event::Start(BytesStart::new(element)))?;
        write_inline_dataarray(writer, &self.connectivity, Some("connectivity"), 1, encoding)?;
        write_inline_dataarray(writer, &self.offsets, Some("offsets"), 1, encoding)?;
        writer.write_event(Event::End(BytesEnd::new(element)))?;

        writer.write_event(Event::End(BytesEnd::new("Piece")))?;

        Ok(())
    }
}

impl From<&Collection> for Piece {
    fn from(collection: &Collection) -> Self {
        match collection {
            Collection::Patches { patches, .. } => {
                let mut piece = Piece::new(Topology::Polys);
                for patch in patches {
                    piece.push_cell(&patch.vertices);
                }
                piece.cell_data = Some(CellArray {
                    name: "value",
                    components: 1,
                    values: patches
                        .iter()
                        .map(|patch| patch.value.unwrap_or(f64::NAN))
                        .collect(),
                });
                piece
            }
            Collection::Lines { lines, .. } => {
                let mut piece = Piece::new(Topology::Lines);
                for line in lines {
                    piece.push_cell(line);
                }
                piece
            }
            Collection::Points { points, .. } => {
                let mut piece = Piece::new(Topology::Verts);
                for point in points {
                    piece.push_cell(&[*point]);
                }
                piece
            }
            Collection::Arrows { arrows, .. } => {
                let mut piece = Piece::new(Topology::Lines);
                for arrow in arrows {
                    let tip = [
                        arrow.origin[0] + arrow.vector[0],
                        arrow.origin[1] + arrow.vector[1],
                    ];
                    piece.push_cell(&[arrow.origin, tip]);
                }
                piece.cell_data = Some(CellArray {
                    name: "vector",
                    components: 3,
                    values: arrows
                        .iter()
                        .flat_map(|arrow| [arrow.vector[0], arrow.vector[1], 0.0])
                        .collect(),
                });
                piece
            }
        }
    }
}

/// numbers that can be written to a `DataArray`
trait Numeric: Copy {
    const VTK_TYPE: &'static str;

    fn push_ascii(self, out: &mut String);

    fn extend_le_bytes(self, out: &mut Vec<u8>);
}

impl Numeric for f64 {
    const VTK_TYPE: &'static str = "Float64";

    fn push_ascii(self, out: &mut String) {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(self));
    }

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl Numeric for i64 {
    const VTK_TYPE: &'static str = "Int64";

    fn push_ascii(self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

fn write_inline_dataarray<W: Write, N: Numeric>(
    writer: &mut Writer<W>,
    data: &[N],
    name: Option<&str>,
    components: usize,
    encoding: Encoding,
) -> Result<(), Error> {
    let components = components.to_string();

    let mut start = BytesStart::new("DataArray");
    start.push_attribute(("type", N::VTK_TYPE));
    if let Some(name) = name {
        start.push_attribute(("Name", name));
    }
    start.push_attribute(("NumberOfComponents", components.as_str()));
    start.push_attribute(("format", encoding.to_str()));
    writer.write_event(Event::Start(start))?;

    let text = match encoding {
        Encoding::Ascii => {
            let mut text = String::new();
            for (i, value) in data.iter().enumerate() {
                if i > 0 {
                    text.push(' ');
                }
                value.push_ascii(&mut text);
            }
            text
        }
        Encoding::Base64 => {
            let mut bytes: Vec<u8> = Vec::with_capacity(8 + data.len() * 8);
            let num_bytes = (data.len() * 8) as u64;
            // UInt64 header with the number of payload bytes
            bytes.extend_from_slice(&num_bytes.to_le_bytes());
            data.iter().for_each(|value| value.extend_le_bytes(&mut bytes));
            base64::encode(bytes.as_slice())
        }
    };

    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}
