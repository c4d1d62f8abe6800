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

/// Set GDAL's process-wide raster block cache budget, in megabytes
///
/// GDAL keeps a single block cache shared by every open dataset, so
/// this is inherently process-global state: concurrent scans that set
/// conflicting budgets race and the last write wins. Call it once
/// before the first raster is opened; prefer configuring it at process
/// startup over per-query settings.
pub fn set_gdal_cache_mb(cache_mb: usize) -> Result<(), ArrowError> {
    log::debug!("setting GDAL_CACHEMAX to {cache_mb} MB");
    gdal::config::set_config_option("GDAL_CACHEMAX", &cache_mb.to_string())
        .map_err(|e| ArrowError::ParseError(format!("Failed to set GDAL_CACHEMAX: {e}")))
}
