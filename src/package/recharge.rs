use super::array_io::{integer_pair, parameter_line, read_array, write_array, LineReader};
use super::transient::{KperEntry, Transient2d};
use crate::config::PackageConfig;
use crate::error::PackageError;
use crate::grid::Grid;
use crate::traits::BoundaryCondition;

use ndarray::Array2;
use std::collections::BTreeSet;
use std::io::{BufRead, Write};

/// Which layer receives the recharge of a horizontal cell (`NRCHOP`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechargeOption {
    /// always the top layer
    TopLayer = 1,
    /// the layer given by the `irch` array
    SpecifiedLayer = 2,
    /// the highest active cell of each column
    HighestActive = 3,
}

impl TryFrom<i64> for RechargeOption {
    type Error = PackageError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::TopLayer),
            2 => Ok(Self::SpecifiedLayer),
            3 => Ok(Self::HighestActive),
            other => Err(PackageError::InvalidOption(other)),
        }
    }
}

/// Areal recharge package.
///
/// `rech` holds the recharge flux per stress period. `irch` holds the zero-based
/// layer number of every cell and is only used with
/// [`RechargeOption::SpecifiedLayer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recharge {
    pub config: PackageConfig,
    pub nrchop: RechargeOption,
    /// cell-by-cell budget unit, 0 disables the output
    pub ipakcb: i32,
    pub rech: Transient2d<f32>,
    pub irch: Option<Transient2d<i32>>,
}

impl Recharge {
    /// A package for a `(nrow, ncol)` grid with a recharge of `1e-3` applied to
    /// the highest active cell.
    pub fn new(nrow: usize, ncol: usize) -> Self {
        Self {
            config: PackageConfig::recharge(),
            nrchop: RechargeOption::HighestActive,
            ipakcb: 0,
            rech: Transient2d::constant((nrow, ncol), 1e-3),
            irch: None,
        }
    }

    pub fn with_config(mut self, config: PackageConfig) -> Self {
        self.config = config;
        self
    }

    /// switch the layer option, adding an all-zero `irch` array for
    /// [`RechargeOption::SpecifiedLayer`] if there is none
    pub fn with_option(mut self, nrchop: RechargeOption) -> Self {
        if nrchop == RechargeOption::SpecifiedLayer && self.irch.is_none() {
            self.irch = Some(Transient2d::constant(self.rech.shape(), 0));
        }
        self.nrchop = nrchop;
        self
    }

    pub fn with_rech(mut self, rech: Transient2d<f32>) -> Self {
        self.rech = rech;
        self
    }

    pub fn with_irch(mut self, irch: Transient2d<i32>) -> Self {
        self.irch = Some(irch);
        self
    }

    pub fn with_ipakcb(mut self, ipakcb: i32) -> Self {
        self.ipakcb = ipakcb;
        self
    }

    /// maximum number of cells that can receive recharge
    pub fn ncells(&self) -> usize {
        let (nrow, ncol) = self.rech.shape();
        nrow * ncol
    }

    fn layer_array(&self) -> Result<Option<&Transient2d<i32>>, PackageError> {
        match self.nrchop {
            RechargeOption::SpecifiedLayer => {
                self.irch.as_ref().map(Some).ok_or(PackageError::MissingLayerArray)
            }
            _ => Ok(None),
        }
    }

    /// Write the package for `nper` stress periods.
    pub fn write<W: Write>(&self, mut writer: W, nper: usize) -> Result<(), PackageError> {
        let irch = self.layer_array()?;

        writeln!(writer, "{}", self.config.heading)?;
        writeln!(writer, "{:10}{:10}", self.nrchop as i32, self.ipakcb)?;

        for kper in 0..nper {
            let rech = self.rech.kper_entry(kper);
            let layers = irch.map(|irch| irch.kper_entry(kper));

            let inrech = entry_flag(&rech);
            let inirch = layers.as_ref().map(entry_flag).unwrap_or(-1);

            writeln!(writer, "{:10}{:10} # Stress period {}", inrech, inirch, kper + 1)?;

            let name = format!("rech_{}", kper + 1);
            match rech {
                KperEntry::Defined(array) => write_array(&mut writer, array, &name)?,
                KperEntry::Undefined => {
                    write_array(&mut writer, &Array2::<f32>::zeros(self.rech.shape()), &name)?
                }
                KperEntry::Reuse => (),
            }

            // layers are one-based in the file
            let name = format!("irch_{}", kper + 1);
            match layers {
                Some(KperEntry::Defined(array)) => {
                    write_array(&mut writer, &array.mapv(|layer| layer + 1), &name)?
                }
                Some(KperEntry::Undefined) => {
                    write_array(&mut writer, &Array2::<i32>::ones(self.rech.shape()), &name)?
                }
                Some(KperEntry::Reuse) | None => (),
            }
        }

        log::info!(
            "wrote {} package ({} stress periods, NRCHOP = {})",
            self.config.name,
            nper,
            self.nrchop as i32
        );

        Ok(())
    }

    /// Read a package for a `(nrow, ncol)` grid with `nper` stress periods.
    pub fn load<R: BufRead>(
        reader: R,
        nrow: usize,
        ncol: usize,
        nper: usize,
        config: PackageConfig,
    ) -> Result<Self, PackageError> {
        let mut lines = LineReader::new(reader);
        let shape = (nrow, ncol);

        let (mut line_no, mut line) = lines.next_data_line("NRCHOP and IRCHCB")?;

        if let Ok((_, npar)) = parameter_line(&line) {
            if npar > 0 {
                return Err(PackageError::Parameters { npar });
            }
            (line_no, line) = lines.next_line("NRCHOP and IRCHCB")?;
        }

        let (nrchop, ipakcb) = match integer_pair(&line) {
            Ok((_, (nrchop, ipakcb))) => (nrchop, ipakcb.unwrap_or(0)),
            Err(_) => return Err(PackageError::parse(line_no, "expected NRCHOP and IRCHCB")),
        };
        let nrchop = RechargeOption::try_from(nrchop)?;
        let ipakcb = i32::try_from(ipakcb)
            .map_err(|_| PackageError::parse(line_no, format!("IRCHCB {ipakcb} is out of range")))?;

        let mut rech = Transient2d::new(shape);
        let mut irch = match nrchop {
            RechargeOption::SpecifiedLayer => Some(Transient2d::new(shape)),
            _ => None,
        };

        for kper in 0..nper {
            let what = format!("stress period {}", kper + 1);
            let (line_no, line) = lines.next_line(&what)?;

            let (inrech, inirch) = match integer_pair(&line) {
                Ok((_, (inrech, inirch))) => (inrech, inirch.unwrap_or(-1)),
                Err(_) => return Err(PackageError::parse(line_no, "expected INRECH")),
            };

            if inrech >= 0 {
                log::debug!("loading rech for {}", what);
                rech.insert(kper, read_array(&mut lines, shape, "rech")?)?;
            }

            if let Some(irch) = irch.as_mut() {
                if inirch >= 0 {
                    let layers: Array2<i32> = read_array(&mut lines, shape, "irch")?;
                    irch.insert(kper, layers.mapv(|layer| layer - 1))?;
                }
            }
        }

        log::info!("loaded {} package with {} stress periods", config.name, nper);

        Ok(Self {
            config,
            nrchop,
            ipakcb,
            rech,
            irch,
        })
    }

    /// layer that receives the recharge of `node`, if any
    fn recharge_layer(&self, grid: &Grid, kper: usize, node: usize) -> Option<usize> {
        match self.nrchop {
            RechargeOption::TopLayer => Some(0),
            RechargeOption::SpecifiedLayer => {
                let (_, ncol) = self.rech.shape();
                let layer = self.irch.as_ref()?.get(kper)?[[node / ncol, node % ncol]];
                usize::try_from(layer).ok().filter(|layer| *layer < grid.nlay())
            }
            RechargeOption::HighestActive => (0..grid.nlay()).find(|layer| grid.is_active(*layer, node)),
        }
    }
}

fn entry_flag<T>(entry: &KperEntry<'_, T>) -> i32 {
    match entry {
        KperEntry::Reuse => -1,
        _ => 1,
    }
}

impl BoundaryCondition for Recharge {
    fn name(&self) -> &str {
        &self.config.name
    }

    /// cells with a non-zero recharge, on the layer selected by `nrchop`
    fn cells(&self, grid: &Grid, kper: usize) -> BTreeSet<(usize, usize)> {
        let rech = match self.rech.get(kper) {
            Some(rech) => rech,
            None => return BTreeSet::new(),
        };

        let ncol = rech.ncols();

        rech.indexed_iter()
            .filter(|(_, value)| **value != 0.0)
            .map(|((row, col), _)| row * ncol + col)
            .filter(|node| *node < grid.ncpl())
            .filter_map(|node| {
                self.recharge_layer(grid, kper, node)
                    .map(|layer| (layer, node))
            })
            .collect()
    }
}
