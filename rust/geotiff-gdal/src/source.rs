// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use arrow_schema::ArrowError;
use gdal::Dataset;

/// A single-band raster that can be read row-by-row as `f64`
///
/// This is the seam between the windowed scan and the storage layer:
/// one implementation wraps GDAL, tests substitute an in-memory grid.
/// Implementations are exclusively owned by one scan and are not
/// required to be reentrant.
pub trait RasterSource: Send {
    /// Raster width and height in pixels
    ///
    /// Dimensions are `i64` because `width * height` can exceed the
    /// 32-bit range for large rasters.
    fn dimensions(&self) -> (i64, i64);

    /// The band's no-data sentinel, if one is declared
    fn no_data(&self) -> Option<f64>;

    /// The band's natural block height, 0 when the source reports none
    fn block_height(&self) -> usize;

    /// Read `nrows` full-width rows starting at `row0` into `out`
    ///
    /// Samples are converted to `f64` by the source. `out` must hold at
    /// least `width * nrows` elements; only that prefix is written.
    fn read_rows(&mut self, row0: i64, nrows: usize, out: &mut [f64]) -> Result<(), ArrowError>;
}

/// [`RasterSource`] implementation over a GDAL dataset
///
/// Opens the dataset read-only and pins one 1-based band. Band
/// metadata (no-data value, block size) is captured at construction;
/// each windowed read re-borrows the band from the dataset, which is a
/// cheap handle lookup in GDAL.
#[derive(Debug)]
pub struct GdalRasterSource {
    dataset: Dataset,
    band_index: usize,
    width: i64,
    height: i64,
    no_data: Option<f64>,
    block_height: usize,
}

impl GdalRasterSource {
    /// Open `path` and select `band` (1-based)
    pub fn open(path: &str, band: usize) -> Result<Self, ArrowError> {
        let dataset = Dataset::open(path)
            .map_err(|e| ArrowError::ParseError(format!("Failed to open raster '{path}': {e}")))?;
        Self::try_new(dataset, band)
    }

    /// Wrap an already-open dataset, selecting `band` (1-based)
    pub fn try_new(dataset: Dataset, band: usize) -> Result<Self, ArrowError> {
        let band_count = dataset.raster_count();
        if band < 1 || band > band_count {
            return Err(ArrowError::ParseError(format!(
                "Requested band {band} but the raster has only {band_count} band(s)"
            )));
        }

        let (width, height) = dataset.raster_size();
        let (no_data, block_height) = {
            let rasterband = dataset
                .rasterband(band)
                .map_err(|e| ArrowError::ParseError(format!("Failed to access band {band}: {e}")))?;
            (rasterband.no_data_value(), rasterband.block_size().1)
        };

        log::debug!(
            "opened raster band {band}/{band_count}: {width}x{height}, \
             block_height={block_height}, no_data={no_data:?}"
        );

        Ok(Self {
            dataset,
            band_index: band,
            width: width as i64,
            height: height as i64,
            no_data,
            block_height,
        })
    }
}

impl RasterSource for GdalRasterSource {
    fn dimensions(&self) -> (i64, i64) {
        (self.width, self.height)
    }

    fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    fn block_height(&self) -> usize {
        self.block_height
    }

    fn read_rows(&mut self, row0: i64, nrows: usize, out: &mut [f64]) -> Result<(), ArrowError> {
        let band = self.dataset.rasterband(self.band_index).map_err(|e| {
            ArrowError::ParseError(format!("Failed to access band {}: {e}", self.band_index))
        })?;

        let width = self.width as usize;
        let window = (width, nrows);
        band.read_into_slice(
            (0, row0 as isize),
            window,
            window,
            &mut out[..width * nrows],
            None,
        )
        .map_err(|e| ArrowError::ParseError(format!("Failed to read raster at row {row0}: {e}")))
    }
}
