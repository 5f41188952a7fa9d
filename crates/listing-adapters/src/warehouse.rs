//! Warehouse local sobre archivos CSV.
//!
//! Cada carga lee el objeto desde el `ObjectStore`, lo interpreta según las
//! `CopyOptions` (encabezados a ignorar, delimitador) y escribe las filas en
//! `<root>/<schema>/<table>/<key escapada>.csv`. Recargar la misma key reemplaza el
//! archivo de forma atómica, así una key nunca queda cargada a medias.
//!
//! No transforma nada: un payload JSON (la respuesta cruda de la API) se
//! rechaza en vez de cargarse como filas basura.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use listing_core::adapter::{CopyOptions, DataFormat, LoadError, LoadRequest, LoadSummary, ObjectStore, StoreError,
                            WarehouseLoader};
use log::info;

pub struct FsWarehouse {
    root: PathBuf,
    store: Arc<dyn ObjectStore>,
}

impl FsWarehouse {
    pub fn new(root: impl Into<PathBuf>, store: Arc<dyn ObjectStore>) -> Self {
        Self { root: root.into(),
               store }
    }

    pub fn table_dir(&self, schema: &str, table: &str) -> PathBuf {
        self.root.join(schema).join(table)
    }

    /// Filas cargadas desde `source_key`, o `None` si la key nunca se cargó.
    pub fn loaded_rows(&self, schema: &str, table: &str, source_key: &str) -> Result<Option<Vec<Vec<String>>>, LoadError> {
        let path = self.table_dir(schema, table).join(file_name_for(source_key));
        if !path.is_file() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(&path).map_err(csv_error)?;
        let rows = reader.records()
                         .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
                         .collect::<Result<Vec<Vec<String>>, _>>()
                         .map_err(csv_error)?;
        Ok(Some(rows))
    }
}

/// Escapa `%` y `/` (`%25`, `%2F`): dos keys distintas nunca comparten archivo.
fn file_name_for(source_key: &str) -> String {
    let mut name = String::with_capacity(source_key.len() + 4);
    for c in source_key.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            other => name.push(other),
        }
    }
    name.push_str(".csv");
    name
}

fn csv_error(e: csv::Error) -> LoadError {
    LoadError::Rejected(e.to_string())
}

fn parse_rows(bytes: &[u8], options: &CopyOptions) -> Result<Vec<csv::StringRecord>, LoadError> {
    match options.format {
        DataFormat::Csv => {}
    }
    if looks_like_json(bytes) {
        return Err(LoadError::Rejected("payload is JSON, expected delimited text (transform it before loading)".into()));
    }
    if !options.delimiter.is_ascii() {
        return Err(LoadError::Rejected(format!("delimiter {:?} is not a single byte", options.delimiter)));
    }
    let mut reader = csv::ReaderBuilder::new().has_headers(false)
                                              .delimiter(options.delimiter as u8)
                                              .from_reader(bytes);
    reader.records()
          .skip(options.ignore_header as usize)
          .collect::<Result<Vec<_>, _>>()
          .map_err(csv_error)
}

fn looks_like_json(bytes: &[u8]) -> bool {
    let start = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    matches!(start.iter().find(|b| !b.is_ascii_whitespace()), Some(b'{') | Some(b'['))
}

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

fn write_rows(path: &Path, rows: &[csv::StringRecord]) -> Result<(), LoadError> {
    let tmp = path.with_extension(format!("{}.{}.partial", std::process::id(), WRITE_SEQ.fetch_add(1, Ordering::Relaxed)));
    {
        let mut writer = csv::Writer::from_path(&tmp).map_err(csv_error)?;
        for row in rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl WarehouseLoader for FsWarehouse {
    fn load(&self, request: &LoadRequest) -> Result<LoadSummary, LoadError> {
        let bytes = self.store.get(&request.source_key).map_err(|e| match e {
                                                             StoreError::NotFound(k) => LoadError::SourceUnavailable(k),
                                                             other => LoadError::SourceUnavailable(other.to_string()),
                                                         })?;
        let rows = parse_rows(&bytes, &request.options)?;

        let dir = self.table_dir(&request.schema, &request.table);
        fs::create_dir_all(&dir)?;
        write_rows(&dir.join(file_name_for(&request.source_key)), &rows)?;

        info!("loaded {} rows from {} into {}.{} ({})",
              rows.len(),
              request.source_key,
              request.schema,
              request.table,
              request.options);
        Ok(LoadSummary { rows_loaded: rows.len() as u64 })
    }
}
