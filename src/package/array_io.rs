//! reading and writing of 2D array records

use crate::error::PackageError;

use ndarray::Array2;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till1};
use nom::character::complete::{i64 as integer, space0, space1};
use nom::combinator::{map, map_res, opt};
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;
use num_traits::NumCast;
use std::io::{BufRead, Write};

/// number of values per line of an `INTERNAL` block
const VALUES_PER_LINE: usize = 10;

/// element types that can appear in a package array
pub(crate) trait ArrayValue: Copy + PartialEq + NumCast {
    fn format(self) -> String;
}

impl ArrayValue for f32 {
    fn format(self) -> String {
        let mut buffer = ryu::Buffer::new();
        buffer.format(self).to_string()
    }
}

impl ArrayValue for i32 {
    fn format(self) -> String {
        self.to_string()
    }
}

/// Line oriented reader that keeps track of the current line number
pub(crate) struct LineReader<R> {
    inner: R,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, line_no: 0 }
    }

    /// next line, with its (one-based) number
    pub(crate) fn next_line(&mut self, what: &str) -> Result<(usize, String), PackageError> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Err(PackageError::eof(what));
        }
        self.line_no += 1;
        Ok((self.line_no, line))
    }

    /// next line that is not a `#` comment
    pub(crate) fn next_data_line(&mut self, what: &str) -> Result<(usize, String), PackageError> {
        loop {
            let (line_no, line) = self.next_line(what)?;
            if !line.trim_start().starts_with('#') {
                return Ok((line_no, line));
            }
        }
    }
}

/// Array control record
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ArrayControl {
    Constant(f64),
    Internal { mult: f64 },
}

/// number that may use a Fortran `D` exponent
fn real(input: &str) -> IResult<&str, f64> {
    map_res(
        take_till1(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == '#'),
        |token: &str| token.replace(['d', 'D'], "e").parse::<f64>(),
    )(input)
}

fn constant(input: &str) -> IResult<&str, ArrayControl> {
    map(
        preceded(tuple((space0, tag_no_case("CONSTANT"), space1)), real),
        ArrayControl::Constant,
    )(input)
}

fn internal(input: &str) -> IResult<&str, ArrayControl> {
    map(
        preceded(tuple((space0, tag_no_case("INTERNAL"), space1)), real),
        |mult| ArrayControl::Internal { mult },
    )(input)
}

/// fixed format record `LOCAT CNSTNT ...` with `LOCAT = 0`
fn fixed_constant(input: &str) -> IResult<&str, ArrayControl> {
    map(
        preceded(tuple((space0, tag("0"), space1)), real),
        ArrayControl::Constant,
    )(input)
}

pub(crate) fn array_control(input: &str) -> IResult<&str, ArrayControl> {
    alt((constant, internal, fixed_constant))(input)
}

/// `PARAMETER NPAR`
pub(crate) fn parameter_line(input: &str) -> IResult<&str, i64> {
    preceded(tuple((space0, tag_no_case("PARAMETER"), space1)), integer)(input)
}

/// one integer followed by an optional second one, as in `NRCHOP IRCHCB` or
/// `INRECH INIRCH`
pub(crate) fn integer_pair(input: &str) -> IResult<&str, (i64, Option<i64>)> {
    pair(
        preceded(space0, integer),
        opt(preceded(space1, integer)),
    )(input)
}

fn cast<T: ArrayValue>(value: f64, line_no: usize) -> Result<T, PackageError> {
    <T as NumCast>::from(value).ok_or_else(|| PackageError::parse(line_no, format!("{value} is out of range")))
}

/// Read one array record (control line plus data) of the given shape.
pub(crate) fn read_array<R: BufRead, T: ArrayValue>(
    lines: &mut LineReader<R>,
    shape: (usize, usize),
    name: &str,
) -> Result<Array2<T>, PackageError> {
    let (line_no, line) = lines.next_line(name)?;

    let control = match array_control(&line) {
        Ok((_, control)) => control,
        Err(_) => return Err(PackageError::UnsupportedArrayControl(line.trim().to_string())),
    };

    match control {
        ArrayControl::Constant(value) => Ok(Array2::from_elem(shape, cast(value, line_no)?)),
        ArrayControl::Internal { mult } => {
            let size = shape.0 * shape.1;
            let mut values = Vec::with_capacity(size);

            while values.len() < size {
                let (line_no, line) = lines.next_line(name)?;
                let tokens = line
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|token| !token.is_empty());

                for token in tokens.take(size - values.len()) {
                    let value = match real(token) {
                        Ok(("", value)) => value,
                        _ => {
                            return Err(PackageError::parse(
                                line_no,
                                format!("`{token}` is not a number"),
                            ))
                        }
                    };
                    values.push(cast(value * mult, line_no)?);
                }
            }

            Array2::from_shape_vec(shape, values)
                .map_err(|e| PackageError::parse(line_no, e.to_string()))
        }
    }
}

/// Write `array` as a `CONSTANT` record if it is uniform, as an `INTERNAL` block otherwise.
pub(crate) fn write_array<W: Write, T: ArrayValue>(
    writer: &mut W,
    array: &Array2<T>,
    name: &str,
) -> std::io::Result<()> {
    if let Some(first) = array.iter().next() {
        if array.iter().all(|value| value == first) {
            return writeln!(writer, "CONSTANT {:>15}  #{}", first.format(), name);
        }
    }

    writeln!(writer, "INTERNAL 1.0 (FREE) -1  #{}", name)?;
    for row in array.rows() {
        let values: Vec<String> = row.iter().map(|value| value.format()).collect();
        for chunk in values.chunks(VALUES_PER_LINE) {
            writeln!(writer, "{}", chunk.join(" "))?;
        }
    }

    Ok(())
}
