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

/// A reusable window of contiguous raster rows
///
/// One allocation per scan, refilled in place as the scan consumes it.
/// Cursor invariants: `pos <= len <= width * buffer_rows`, `next_row`
/// is monotone and capped at `height`. The window is empty (`len == 0`)
/// before the first refill and again once the source is exhausted.
pub(crate) struct RowWindow {
    buf: Vec<f64>,
    buffer_rows: usize,
    width: i64,
    height: i64,
    /// Dataset row held at the front of the buffer
    buf_row0: i64,
    /// Next dataset row not yet read into any window
    next_row: i64,
    /// Next unconsumed element offset within `buf`
    pos: usize,
    /// Valid elements currently in `buf`
    len: usize,
}

impl RowWindow {
    pub fn new(width: i64, height: i64, block_height: usize, target_mb: usize) -> Self {
        let buffer_rows = sized_rows(width, height, block_height, target_mb);
        log::debug!(
            "row window: {buffer_rows} rows x {width} px \
             (target {target_mb} MB, block height {block_height})"
        );
        Self {
            buf: vec![0.0; width as usize * buffer_rows],
            buffer_rows,
            width,
            height,
            buf_row0: 0,
            next_row: 0,
            pos: 0,
            len: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.len
    }

    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Cell id of the sample at buffer offset 0
    pub fn cell0(&self) -> i64 {
        self.buf_row0 * self.width
    }

    pub fn values(&self) -> &[f64] {
        &self.buf[..self.len]
    }

    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.len);
        self.pos += n;
    }

    /// Read the next run of rows from `source` into the window
    ///
    /// Leaves the window empty when the source is exhausted; that is
    /// the terminal signal, not an error. Any read failure is fatal to
    /// the scan and is never retried.
    pub fn refill(&mut self, source: &mut dyn RasterSource) -> Result<(), ArrowError> {
        if self.next_row >= self.height {
            self.len = 0;
            return Ok(());
        }

        let rows_to_read = (self.buffer_rows as i64).min(self.height - self.next_row) as usize;
        let pixels = self.width as usize * rows_to_read;
        source.read_rows(self.next_row, rows_to_read, &mut self.buf[..pixels])?;

        self.buf_row0 = self.next_row;
        self.next_row += rows_to_read as i64;
        self.pos = 0;
        self.len = pixels;
        Ok(())
    }
}

/// Number of rows the window should hold for a `target_mb` budget
///
/// The budget is translated to whole rows, floored at the natural block
/// height, rounded up to a block-height multiple so windowed reads line
/// up with the raster's internal tiling, and clamped to the raster
/// height. Always at least one row for a non-empty raster.
fn sized_rows(width: i64, height: i64, block_height: usize, target_mb: usize) -> usize {
    let byte_budget = target_mb * 1024 * 1024;
    let pixel_budget = (byte_budget / std::mem::size_of::<f64>()).max(1);
    let block = block_height.max(1);

    let rows = (pixel_budget / width.max(1) as usize).max(block);
    let rows = rows.div_ceil(block) * block;
    rows.min(height.max(0) as usize)
}
