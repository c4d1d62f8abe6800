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

use datafusion::{
    catalog::{TableFunctionImpl, TableProvider},
    common::{plan_err, Result, ScalarValue},
    prelude::{Expr, SessionContext},
};

use crate::{provider::GeoTiffTableProvider, GeoTiffReadOptions};

/// Option names in their positional order after the path argument
const OPTION_NAMES: [&str; 3] = ["band", "target_mb", "cache_mb"];

/// The `read_geotiff` table function
///
/// `read_geotiff('path' [, band [, target_mb [, cache_mb]]])`
///
/// Binding validates arguments and declares the output schema; the
/// raster is not touched until the resulting table is scanned. Options
/// may be given positionally or as aliased literals (`band => 2`
/// notation, where the planner preserves the name as an alias).
#[derive(Debug, Default)]
pub struct ReadGeoTiff {}

impl TableFunctionImpl for ReadGeoTiff {
    fn call(&self, args: &[Expr]) -> Result<Arc<dyn TableProvider>> {
        let Some(first) = args.first() else {
            return plan_err!("read_geotiff requires a file path argument");
        };

        let (path_expr, _) = unalias(first);
        let path = match path_expr {
            Expr::Literal(ScalarValue::Utf8(Some(path)), _)
            | Expr::Literal(ScalarValue::LargeUtf8(Some(path)), _)
            | Expr::Literal(ScalarValue::Utf8View(Some(path)), _) => path.clone(),
            _ => return plan_err!("read_geotiff: path must be a string literal"),
        };

        let mut options = GeoTiffReadOptions::default();
        for (position, arg) in args.iter().skip(1).enumerate() {
            let (expr, alias) = unalias(arg);
            let name = match alias {
                Some(name) => name,
                None => match OPTION_NAMES.get(position) {
                    Some(name) => *name,
                    None => {
                        return plan_err!(
                            "read_geotiff takes at most {} arguments",
                            OPTION_NAMES.len() + 1
                        )
                    }
                },
            };
            let value = integer_option(name, expr)?;

            if name.eq_ignore_ascii_case("band") {
                options.band = value.try_into().map_err(|_| {
                    datafusion::error::DataFusionError::Plan(format!(
                        "read_geotiff: band {value} is out of range"
                    ))
                })?;
            } else if name.eq_ignore_ascii_case("target_mb") {
                options.target_mb = non_negative(name, value)?;
            } else if name.eq_ignore_ascii_case("cache_mb") {
                options.cache_mb = non_negative(name, value)?;
            } else {
                return plan_err!("read_geotiff: unknown option '{name}'");
            }
        }

        Ok(Arc::new(GeoTiffTableProvider::try_new(path, options)?))
    }
}

/// Register `read_geotiff` on a session context
pub fn register_geotiff(ctx: &SessionContext) {
    ctx.register_udtf("read_geotiff", Arc::new(ReadGeoTiff::default()));
}

fn unalias(expr: &Expr) -> (&Expr, Option<&str>) {
    match expr {
        Expr::Alias(alias) => (alias.expr.as_ref(), Some(alias.name.as_str())),
        other => (other, None),
    }
}

fn integer_option(name: &str, expr: &Expr) -> Result<i64> {
    match expr {
        Expr::Literal(ScalarValue::Int64(Some(value)), _) => Ok(*value),
        Expr::Literal(ScalarValue::Int32(Some(value)), _) => Ok(*value as i64),
        Expr::Literal(ScalarValue::UInt64(Some(value)), _) if *value <= i64::MAX as u64 => {
            Ok(*value as i64)
        }
        _ => plan_err!("read_geotiff: option '{name}' must be an integer literal"),
    }
}

fn non_negative(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_or_else(
        |_| plan_err!("read_geotiff: option '{name}' must be >= 0, got {value}"),
        Ok,
    )
}
