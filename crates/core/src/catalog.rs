//! Equipment catalog.
//!
//! The catalog is a table with one row per equipment item, kept either as a
//! spreadsheet workbook (first sheet) or as CSV:
//!
//! ```text
//! equipment,Cost,Universal healthcare,UCEP,Social Security,Civil Service,Self pay
//! Angiogram,12000,8000,10000,9000,12000,
//! ```
//!
//! `equipment` is the unique row key, `Cost` the unit cost, and each scheme's
//! column label (see [`Scheme::label`]) holds the per-unit reimbursement rate.
//! Extra columns are ignored. The catalog is loaded once at startup and never
//! mutated afterwards.

use crate::constants::{COST_COLUMN, EQUIPMENT_COLUMN, WORKBOOK_EXTENSIONS};
use crate::scheme::Scheme;
use crate::{CathlabError, CathlabResult};
use cathlab_types::NonEmptyText;
use calamine::{open_workbook_auto, Reader};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A single catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentEntry {
    name: NonEmptyText,
    unit_cost: Decimal,
    rates: BTreeMap<Scheme, Decimal>,
}

impl EquipmentEntry {
    pub fn new(name: NonEmptyText, unit_cost: Decimal, rates: BTreeMap<Scheme, Decimal>) -> Self {
        Self {
            name,
            unit_cost,
            rates,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn unit_cost(&self) -> Decimal {
        self.unit_cost
    }

    /// Per-unit reimbursement under `scheme`. Schemes without a rate reimburse nothing.
    pub fn rate(&self, scheme: Scheme) -> Decimal {
        self.rates.get(&scheme).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Immutable, ordered collection of equipment entries keyed by name.
#[derive(Debug, Clone, Default)]
pub struct EquipmentCatalog {
    entries: Vec<EquipmentEntry>,
    index: HashMap<String, usize>,
}

impl EquipmentCatalog {
    /// Builds a catalog from already-parsed entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`CathlabError::DuplicateEquipment`] if two entries share a name.
    pub fn from_entries(entries: Vec<EquipmentEntry>) -> CathlabResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.name().to_string(), position).is_some() {
                return Err(CathlabError::DuplicateEquipment(entry.name().to_string()));
            }
        }
        Ok(Self { entries, index })
    }

    /// Loads the catalog from a workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`)
    /// or, for any other extension, from CSV.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if the file cannot be opened or any row is malformed
    /// (see [`EquipmentCatalog::from_reader`]).
    pub fn load(path: impl AsRef<Path>) -> CathlabResult<Self> {
        let path = path.as_ref();
        let catalog = if is_workbook(path) {
            Self::from_workbook(path)?
        } else {
            let file = std::fs::File::open(path).map_err(CathlabError::CatalogRead)?;
            Self::from_reader(file)?
        };
        tracing::info!(
            "loaded {} equipment items from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parses catalog CSV from any reader.
    ///
    /// Amount cells may contain thousands separators. A blank reimbursement cell
    /// counts as zero; a blank cost does not. Fully blank rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if:
    /// - the CSV is malformed or a required column is missing,
    /// - a row has no equipment name or repeats one,
    /// - an amount is not a non-negative decimal.
    pub fn from_reader<R: Read>(reader: R) -> CathlabResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        let rows = csv_reader.records().map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(CathlabError::from)
        });
        Self::from_rows(&headers, rows)
    }

    /// Reads the first sheet of a workbook. The first row holds the headers and
    /// cells follow the same rules as [`EquipmentCatalog::from_reader`].
    ///
    /// # Errors
    ///
    /// Returns a `CathlabError` if the workbook cannot be opened, has no sheet,
    /// or any row is malformed.
    pub fn from_workbook(path: impl AsRef<Path>) -> CathlabResult<Self> {
        let mut workbook = open_workbook_auto(path.as_ref())?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(CathlabError::EmptyWorkbook)??;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()));
        let headers: Vec<String> = rows.next().ok_or(CathlabError::EmptyWorkbook)?.collect();
        Self::from_rows(&headers, rows.map(|row| Ok::<_, CathlabError>(row.collect::<Vec<_>>())))
    }

    fn from_rows<I>(headers: &[String], rows: I) -> CathlabResult<Self>
    where
        I: IntoIterator<Item = CathlabResult<Vec<String>>>,
    {
        let column = |name: &str| -> CathlabResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CathlabError::MissingColumn(name.to_string()))
        };

        let name_col = column(EQUIPMENT_COLUMN)?;
        let cost_col = column(COST_COLUMN)?;
        let rate_cols = Scheme::ALL
            .into_iter()
            .map(|scheme| Ok((scheme, column(scheme.label())?)))
            .collect::<CathlabResult<Vec<_>>>()?;

        let mut entries = Vec::new();
        for (row_index, record) in rows.into_iter().enumerate() {
            let record = record?;
            if record.iter().all(String::is_empty) {
                continue;
            }
            let cell = |col: usize| record.get(col).map_or("", String::as_str);

            // Header is line 1.
            let row = row_index + 2;
            let name = NonEmptyText::new(cell(name_col))
                .map_err(|_| CathlabError::BlankEquipmentName { row })?;

            let unit_cost = parse_amount(cell(cost_col), name.as_str(), COST_COLUMN, false)?;

            let mut rates = BTreeMap::new();
            for (scheme, col) in &rate_cols {
                let rate = parse_amount(cell(*col), name.as_str(), scheme.label(), true)?;
                rates.insert(*scheme, rate);
            }

            entries.push(EquipmentEntry::new(name, unit_cost, rates));
        }

        Self::from_entries(entries)
    }

    pub fn lookup(&self, name: &str) -> Option<&EquipmentEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[EquipmentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn parse_amount(raw: &str, item: &str, column: &str, blank_is_zero: bool) -> CathlabResult<Decimal> {
    let invalid = || CathlabError::InvalidAmount {
        item: item.to_string(),
        column: column.to_string(),
        value: raw.to_string(),
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return if blank_is_zero {
            Ok(Decimal::ZERO)
        } else {
            Err(invalid())
        };
    }

    let amount = Decimal::from_str(&cleaned).map_err(|_| invalid())?;
    if amount.is_sign_negative() {
        return Err(invalid());
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "equipment,Cost,Universal healthcare,UCEP,Social Security,Civil Service,Self pay\n";

    fn catalog(rows: &str) -> CathlabResult<EquipmentCatalog> {
        EquipmentCatalog::from_reader(format!("{HEADER}{rows}").as_bytes())
    }

    #[test]
    fn parses_rows_in_file_order() {
        let catalog = catalog(
            "Angiogram,1000,800,900,850,1000,\nCoil,\"24,000\",15000,20000,18000,24000,0\n",
        )
        .expect("valid catalog");

        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Angiogram", "Coil"]);

        let angiogram = catalog.lookup("Angiogram").expect("present");
        assert_eq!(angiogram.unit_cost(), Decimal::from(1000));
        assert_eq!(angiogram.rate(Scheme::Universal), Decimal::from(800));
        assert_eq!(angiogram.rate(Scheme::SelfPay), Decimal::ZERO);

        let coil = catalog.lookup("Coil").expect("present");
        assert_eq!(coil.unit_cost(), Decimal::from(24_000));
    }

    #[test]
    fn lookup_is_exact() {
        let catalog = catalog("Neuroform atlas,1,1,1,1,1,1\n").expect("valid catalog");
        assert!(catalog.contains("Neuroform atlas"));
        assert!(catalog.lookup("Neuroform ATLAS").is_none());
        assert!(catalog.lookup("Unknown").is_none());
    }

    #[test]
    fn ignores_extra_columns_and_column_order() {
        let csv = "notes,Self pay,Civil Service,Social Security,UCEP,Universal healthcare,Cost,equipment\n\
                   x,0,10,9,8,7,12,Wire\n";
        let catalog = EquipmentCatalog::from_reader(csv.as_bytes()).expect("valid catalog");
        let wire = catalog.lookup("Wire").expect("present");
        assert_eq!(wire.unit_cost(), Decimal::from(12));
        assert_eq!(wire.rate(Scheme::Universal), Decimal::from(7));
        assert_eq!(wire.rate(Scheme::CivilService), Decimal::from(10));
    }

    #[test]
    fn rejects_missing_scheme_column() {
        let csv = "equipment,Cost,Universal healthcare\nAngiogram,1,1\n";
        let err = EquipmentCatalog::from_reader(csv.as_bytes()).expect_err("missing column");
        assert!(matches!(err, CathlabError::MissingColumn(c) if c == "UCEP"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = catalog("Coil,1,1,1,1,1,1\nCoil,2,2,2,2,2,2\n").expect_err("duplicate");
        assert!(matches!(err, CathlabError::DuplicateEquipment(n) if n == "Coil"));
    }

    #[test]
    fn rejects_blank_cost_and_bad_amounts() {
        let err = catalog("Coil,,1,1,1,1,1\n").expect_err("blank cost");
        assert!(matches!(err, CathlabError::InvalidAmount { column, .. } if column == "Cost"));

        let err = catalog("Coil,10,abc,1,1,1,1\n").expect_err("not a number");
        assert!(
            matches!(err, CathlabError::InvalidAmount { column, value, .. } if column == "Universal healthcare" && value == "abc")
        );

        let err = catalog("Coil,-10,1,1,1,1,1\n").expect_err("negative");
        assert!(matches!(err, CathlabError::InvalidAmount { .. }));
    }

    #[test]
    fn rejects_blank_name_but_skips_blank_rows() {
        let catalog_ok = catalog("Coil,1,1,1,1,1,1\n,,,,,,\n").expect("blank row skipped");
        assert_eq!(catalog_ok.len(), 1);

        let err = catalog("Coil,1,1,1,1,1,1\n,5,1,1,1,1,1\n").expect_err("blank name");
        assert!(matches!(err, CathlabError::BlankEquipmentName { row: 3 }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}Angiogram,1000,800,900,850,1000,").expect("write");

        let catalog = EquipmentCatalog::load(file.path()).expect("load");
        assert_eq!(catalog.len(), 1);

        let err = EquipmentCatalog::load(file.path().with_extension("missing"))
            .expect_err("missing file");
        assert!(matches!(err, CathlabError::CatalogRead(_)));
    }

    #[test]
    fn loads_first_sheet_of_a_workbook() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("equipment.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in HEADER.trim_end().split(',').enumerate() {
            sheet.write_string(0, col as u16, header).expect("header");
        }
        sheet.write_string(1, 0, "Angiogram").expect("name");
        for (col, amount) in [1000.0, 800.0, 900.0, 850.0, 1000.0].into_iter().enumerate() {
            sheet.write_number(1, col as u16 + 1, amount).expect("amount");
        }
        sheet.write_string(2, 0, " Coil ").expect("name");
        sheet.write_string(2, 1, "24,000").expect("text amount");
        sheet.write_number(2, 2, 1500.5).expect("fraction");
        workbook.save(&path).expect("save workbook");

        let catalog = EquipmentCatalog::load(&path).expect("load workbook");
        assert_eq!(catalog.len(), 2);

        let angiogram = catalog.lookup("Angiogram").expect("present");
        assert_eq!(angiogram.unit_cost(), Decimal::from(1000));
        assert_eq!(angiogram.rate(Scheme::SocialSecurity), Decimal::from(850));
        assert_eq!(angiogram.rate(Scheme::SelfPay), Decimal::ZERO);

        let coil = catalog.lookup("Coil").expect("trimmed name");
        assert_eq!(coil.unit_cost(), Decimal::from(24_000));
        assert_eq!(coil.rate(Scheme::Universal), Decimal::new(15005, 1));
        assert_eq!(coil.rate(Scheme::Ucep), Decimal::ZERO);
    }

    #[test]
    fn workbook_without_scheme_columns_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("equipment.XLSX");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "equipment").expect("header");
        sheet.write_string(0, 1, "Cost").expect("header");
        sheet.write_string(1, 0, "Angiogram").expect("name");
        sheet.write_number(1, 1, 1000.0).expect("cost");
        workbook.save(&path).expect("save workbook");

        let err = EquipmentCatalog::load(&path).expect_err("missing column");
        assert!(matches!(err, CathlabError::MissingColumn(c) if c == "Universal healthcare"));
    }

    #[test]
    fn unreadable_workbook_is_an_error() {
        let mut file = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .expect("temp file");
        writeln!(file, "{HEADER}Angiogram,1000,800,900,850,1000,").expect("write");

        let err = EquipmentCatalog::load(file.path()).expect_err("not a workbook");
        assert!(matches!(err, CathlabError::Workbook(_)));
    }

    #[test]
    fn bundled_catalog_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/equipment.csv");
        let catalog = EquipmentCatalog::load(path).expect("bundled catalog");
        assert!(catalog.contains("Angiogram"));
        assert!(catalog.contains("0.038 Wire"));
        assert_eq!(
            catalog.lookup("Neuroform atlas").map(|e| e.unit_cost()),
            Some(Decimal::from(120_000))
        );
    }
}
