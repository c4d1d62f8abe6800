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

use arrow_schema::{DataType, Field, Schema, SchemaRef};

/// Options bound by `read_geotiff` before any I/O happens
///
/// A plain value type: the planner may clone bind-time state across
/// plan nodes, so options carry no handles and compare field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoTiffReadOptions {
    /// 1-based raster band to scan
    pub band: i32,
    /// Soft sizing hint for the row window, in megabytes
    ///
    /// Rounding to the band's natural block height and clamping to the
    /// raster height may make the final allocation differ from the
    /// hint. Sizing never changes scan output, only read granularity.
    pub target_mb: usize,
    /// GDAL block cache budget in megabytes, 0 leaves the default
    pub cache_mb: usize,
}

impl Default for GeoTiffReadOptions {
    fn default() -> Self {
        Self {
            band: 1,
            target_mb: 64,
            cache_mb: 0,
        }
    }
}

/// The fixed output schema: `cell_id` BIGINT NOT NULL, `value` DOUBLE
///
/// `cell_id` is the row-major index `row * width + column`; `value` is
/// NULL exactly when the sample equals the band's no-data sentinel.
pub fn read_geotiff_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("cell_id", DataType::Int64, false),
        Field::new("value", DataType::Float64, true),
    ]))
}
