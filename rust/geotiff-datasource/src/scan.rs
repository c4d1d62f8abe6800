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

use std::sync::Arc;

use arrow_array::{Float64Array, Int64Array, RecordBatch};
use arrow_schema::SchemaRef;
use datafusion::error::DataFusionError;
use geotiff_gdal::RasterSource;

use crate::{options::read_geotiff_schema, window::RowWindow};

/// Synchronous batch emitter over a windowed raster scan
///
/// Pulls rows from the window (refilling it from the source on
/// demand), assigns row-major cell ids, masks no-data samples as NULL,
/// and yields record batches of at most `batch_size` rows. Ends the
/// iteration when both window and source are exhausted, or immediately
/// after the first error.
pub(crate) struct CellBatchIter {
    source: Box<dyn RasterSource>,
    window: RowWindow,
    no_data: Option<f64>,
    schema: SchemaRef,
    projection: Arc<[usize]>,
    batch_size: usize,
    rows_remaining: Option<usize>,
    done: bool,
}

impl CellBatchIter {
    pub fn new(
        source: Box<dyn RasterSource>,
        target_mb: usize,
        projection: Arc<[usize]>,
        batch_size: usize,
        limit: Option<usize>,
    ) -> Self {
        let (width, height) = source.dimensions();
        let window = RowWindow::new(width, height, source.block_height(), target_mb);
        let no_data = source.no_data();
        Self {
            source,
            window,
            no_data,
            schema: read_geotiff_schema(),
            projection,
            batch_size,
            rows_remaining: limit,
            done: false,
        }
    }

    fn emit(&mut self, to_emit: usize) -> Result<RecordBatch, DataFusionError> {
        let cell0 = self.window.cell0();
        let pos = self.window.pos();
        let samples = &self.window.values()[pos..pos + to_emit];

        let cell_ids =
            Int64Array::from_iter_values((0..to_emit).map(|i| cell0 + (pos + i) as i64));
        let values: Float64Array = match self.no_data {
            // No sentinel: every sample is a concrete value
            None => samples.iter().copied().collect(),
            // Exact-equality sentinel match; a NaN sentinel never
            // matches, so NaN samples always surface as values
            Some(no_data) => samples
                .iter()
                .map(|&v| if v == no_data { None } else { Some(v) })
                .collect(),
        };

        let batch = RecordBatch::try_new(
            self.schema.clone(),
            vec![Arc::new(cell_ids), Arc::new(values)],
        )?
        .project(&self.projection)?;

        self.window.advance(to_emit);
        Ok(batch)
    }
}

impl Iterator for CellBatchIter {
    type Item = Result<RecordBatch, DataFusionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.rows_remaining == Some(0) {
            self.done = true;
            return None;
        }

        if self.window.is_exhausted() {
            if let Err(e) = self.window.refill(self.source.as_mut()) {
                self.done = true;
                return Some(Err(e.into()));
            }
            if self.window.is_exhausted() {
                self.done = true;
                return None;
            }
        }

        let mut to_emit = self.window.remaining().min(self.batch_size);
        if let Some(remaining) = self.rows_remaining {
            to_emit = to_emit.min(remaining);
            self.rows_remaining = Some(remaining - to_emit);
        }

        match self.emit(to_emit) {
            Ok(batch) => Some(Ok(batch)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::GridSource;
    use arrow_array::cast::AsArray;
    use arrow_array::types::{Float64Type, Int64Type};

    fn collect_cells(
        source: GridSource,
        target_mb: usize,
        batch_size: usize,
        limit: Option<usize>,
    ) -> (Vec<i64>, Vec<Option<f64>>, Vec<usize>) {
        let iter = CellBatchIter::new(
            Box::new(source),
            target_mb,
            Arc::from(vec![0, 1]),
            batch_size,
            limit,
        );

        let mut ids = Vec::new();
        let mut values = Vec::new();
        let mut batch_sizes = Vec::new();
        for batch in iter {
            let batch = batch.unwrap();
            batch_sizes.push(batch.num_rows());
            ids.extend(batch.column(0).as_primitive::<Int64Type>().values().iter());
            values.extend(batch.column(1).as_primitive::<Float64Type>().iter());
        }
        (ids, values, batch_sizes)
    }

    #[test]
    fn full_scan_emits_every_cell_once_in_order() {
        let (ids, values, batches) = collect_cells(GridSource::sequential(4, 3, None), 64, 8192, None);
        assert_eq!(ids, (0..12).collect::<Vec<i64>>());
        assert_eq!(
            values,
            (0..12).map(|i| Some(i as f64)).collect::<Vec<_>>()
        );
        assert_eq!(batches, vec![12]);
    }

    #[test]
    fn batch_size_caps_each_emission() {
        let (ids, _, batches) = collect_cells(GridSource::sequential(4, 3, None), 64, 5, None);
        assert_eq!(batches, vec![5, 5, 2]);
        assert_eq!(ids, (0..12).collect::<Vec<i64>>());
    }

    #[test]
    fn buffer_sizing_never_affects_output() {
        let single_window = collect_cells(GridSource::sequential(4, 3, None), 64, 5, None);
        let row_at_a_time = collect_cells(GridSource::sequential(4, 3, None), 0, 5, None);
        assert_eq!(single_window.0, row_at_a_time.0);
        assert_eq!(single_window.1, row_at_a_time.1);
    }

    #[test]
    fn one_row_window_refills_once_per_row() {
        let mut source = GridSource::sequential(4, 3, None);
        source.block_height = 1;
        let iter = CellBatchIter::new(Box::new(source), 0, Arc::from(vec![0, 1]), 8192, None);
        let batches: Vec<_> = iter.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.num_rows() == 4));
    }

    #[test]
    fn no_data_masks_exactly_matching_samples() {
        let mut source = GridSource::sequential(4, 3, Some(5.0));
        // cell 5 holds the sentinel value, cell 7 is close but not equal
        source.cells[7] = 5.0 + 1e-9;

        let (ids, values, _) = collect_cells(source, 64, 8192, None);
        assert_eq!(ids, (0..12).collect::<Vec<i64>>());
        assert_eq!(values[5], None);
        assert_eq!(values[7], Some(5.0 + 1e-9));
        assert_eq!(values.iter().filter(|v| v.is_none()).count(), 1);
    }

    #[test]
    fn nan_sentinel_never_matches() {
        let mut source = GridSource::sequential(4, 3, Some(f64::NAN));
        source.cells[5] = f64::NAN;

        // NaN != NaN under exact-equality matching, so even the NaN
        // sample surfaces as a value rather than NULL
        let (_, values, _) = collect_cells(source, 64, 8192, None);
        assert!(values.iter().all(|v| v.is_some()));
        assert!(values[5].unwrap().is_nan());
    }

    #[test]
    fn without_sentinel_no_row_is_null() {
        // 5.0 appears in the data but no sentinel is configured
        let (_, values, _) = collect_cells(GridSource::sequential(4, 3, None), 64, 8192, None);
        assert!(values.iter().all(|v| v.is_some()));
    }

    #[test]
    fn empty_raster_yields_no_batches() {
        let (ids, _, batches) = collect_cells(GridSource::sequential(4, 0, None), 64, 8192, None);
        assert!(ids.is_empty());
        assert!(batches.is_empty());

        let (ids, _, _) = collect_cells(GridSource::sequential(0, 3, None), 64, 8192, None);
        assert!(ids.is_empty());
    }

    #[test]
    fn limit_truncates_the_final_batch() {
        let (ids, _, batches) = collect_cells(GridSource::sequential(4, 3, None), 64, 5, Some(7));
        assert_eq!(batches, vec![5, 2]);
        assert_eq!(ids, (0..7).collect::<Vec<i64>>());
    }

    #[test]
    fn read_error_ends_the_scan() {
        let mut source = GridSource::sequential(4, 3, None);
        source.fail_at_row = Some(2);
        source.block_height = 1;

        // one-row window: rows 0 and 1 emit, row 2 fails
        let mut iter = CellBatchIter::new(Box::new(source), 0, Arc::from(vec![0, 1]), 8192, None);
        assert_eq!(iter.next().unwrap().unwrap().num_rows(), 4);
        assert_eq!(iter.next().unwrap().unwrap().num_rows(), 4);
        let err = iter.next().unwrap().unwrap_err().to_string();
        assert!(err.contains("row 2"), "{err}");
        assert!(iter.next().is_none());
    }

    #[test]
    fn projection_is_applied_per_batch() {
        let iter = CellBatchIter::new(
            Box::new(GridSource::sequential(4, 3, None)),
            64,
            Arc::from(vec![1]),
            8192,
            None,
        );
        let batches: Vec<_> = iter.map(|b| b.unwrap()).collect();
        assert_eq!(batches[0].num_columns(), 1);
        assert_eq!(batches[0].schema().field(0).name(), "value");
    }
}
