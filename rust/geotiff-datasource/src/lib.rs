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

//! `read_geotiff`: stream one raster band through DataFusion
//!
//! Exposes a table function that reads a single band of a GDAL-readable
//! raster as a flat `(cell_id, value)` table without materializing the
//! raster. Reads go through a reusable row window sized to a megabyte
//! budget and aligned to the raster's natural block height, so memory
//! use stays bounded no matter how large the file is. Samples equal to
//! the band's no-data sentinel surface as SQL `NULL`.
//!
//! ```rust,no_run
//! # async fn example() -> datafusion::error::Result<()> {
//! use datafusion::prelude::SessionContext;
//! use geotiff_datasource::register_geotiff;
//!
//! let ctx = SessionContext::new();
//! register_geotiff(&ctx);
//!
//! let df = ctx
//!     .sql("SELECT cell_id, value FROM read_geotiff('elevation.tif', 1)")
//!     .await?;
//! df.show().await?;
//! # Ok(())
//! # }
//! ```

mod exec;
mod function;
mod options;
mod provider;
mod scan;
mod window;

#[cfg(test)]
pub(crate) mod test_util;

pub use exec::GeoTiffScanExec;
pub use function::{register_geotiff, ReadGeoTiff};
pub use options::{read_geotiff_schema, GeoTiffReadOptions};
pub use provider::GeoTiffTableProvider;
