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
use geotiff_gdal::RasterSource;

/// In-memory [`RasterSource`] for exercising window and scan logic
/// without raster fixtures
pub(crate) struct GridSource {
    pub width: i64,
    pub height: i64,
    pub cells: Vec<f64>,
    pub no_data: Option<f64>,
    pub block_height: usize,
    /// Number of `read_rows` calls served so far
    pub reads: usize,
    /// Fail the read that covers this dataset row, if set
    pub fail_at_row: Option<i64>,
}

impl GridSource {
    /// A `width x height` grid holding `0.0, 1.0, 2.0, ...` row-major
    pub fn sequential(width: i64, height: i64, no_data: Option<f64>) -> Self {
        let cells = (0..width * height).map(|i| i as f64).collect();
        Self {
            width,
            height,
            cells,
            no_data,
            block_height: 1,
            reads: 0,
            fail_at_row: None,
        }
    }
}

impl RasterSource for GridSource {
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
        if let Some(fail_row) = self.fail_at_row {
            if row0 <= fail_row && fail_row < row0 + nrows as i64 {
                return Err(ArrowError::ParseError(format!(
                    "Synthetic read failure at row {fail_row}"
                )));
            }
        }
        self.reads += 1;

        let start = (row0 * self.width) as usize;
        let count = self.width as usize * nrows;
        out[..count].copy_from_slice(&self.cells[start..start + count]);
        Ok(())
    }
}
