//! FILENAME: pivot-engine/src/cache.rs
//! Pivot Cache - Internal representation of the grouped records.
//!
//! The cache is built in one pass over the records:
//! - Each distinct row/column field value is interned once per field
//! - Every record maps to a (row key, column key) pair of interned ids
//! - Each value field is accumulated per (row key, column key) cell
//!
//! Row, column and grand totals are accumulated in the same scan, so margins
//! see exactly the records the cells saw.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use log::trace;
use table_engine::{CellValue, LevelValue, Table, TableError, TableResult};

use crate::definition::{AggregationType, FieldIndex};

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A reference to an interned value within a field's unique value store.
pub type ValueId = u32;

/// Distinct values of one grouping field.
#[derive(Debug, Clone)]
pub struct FieldCache {
    /// The source field this cache represents.
    pub source_index: FieldIndex,
    pub name: String,
    value_to_id: FxHashMap<LevelValue, ValueId>,
    id_to_value: Vec<LevelValue>,
}

impl FieldCache {
    pub fn new(source_index: FieldIndex, name: String) -> Self {
        FieldCache {
            source_index,
            name,
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
        }
    }

    /// Interns a value and returns its id; repeated values share one id.
    pub fn intern(&mut self, value: LevelValue) -> ValueId {
        if let Some(&id) = self.value_to_id.get(&value) {
            return id;
        }
        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(value, id);
        id
    }

    pub fn get_value(&self, id: ValueId) -> Option<&LevelValue> {
        self.id_to_value.get(id as usize)
    }

    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// Sort rank of every id (indexed by id), ascending by value.
    pub fn sort_ranks(&self) -> Vec<u32> {
        let mut ids: Vec<ValueId> = (0..self.id_to_value.len() as ValueId).collect();
        ids.sort_by(|&a, &b| self.id_to_value[a as usize].cmp(&self.id_to_value[b as usize]));

        let mut ranks = vec![0; ids.len()];
        for (rank, id) in ids.into_iter().enumerate() {
            ranks[id as usize] = rank as u32;
        }
        ranks
    }
}

// ============================================================================
// GROUP KEY
// ============================================================================

/// Interned values of one row or column combination, one id per field.
pub type GroupKey = SmallVec<[ValueId; 4]>;

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// One non-empty source value as the accumulators see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Number(f64),
    /// Text, boolean or date; only counted.
    Other,
}

impl Observation {
    /// Classifies a source cell for `aggregation`. Empty cells yield `None`;
    /// non-numbers are a type error unless the aggregation only counts.
    pub fn from_cell(value: &CellValue, aggregation: AggregationType, field: &str) -> TableResult<Option<Self>> {
        if value.is_empty() {
            return Ok(None);
        }
        if let Some(n) = value.as_number() {
            return Ok(Some(Observation::Number(n)));
        }
        if aggregation.accepts_non_numbers() {
            return Ok(Some(Observation::Other));
        }
        Err(TableError::Type(format!(
            "cannot {} {} value '{}' in field '{}'",
            aggregation.name(),
            value.kind_name(),
            value.display_value(),
            field
        )))
    }
}

/// Running mean and squared deviation of the numbers seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Moments {
    n: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn push(&mut self, x: f64) {
        self.n += 1;
        let before = x - self.mean;
        self.mean += before / self.n as f64;
        self.m2 += before * (x - self.mean);
    }

    /// Sample (`n - 1`) or population (`n`) variance; `None` without
    /// enough numbers.
    fn variance(&self, sample: bool) -> Option<f64> {
        let divisor = if sample { self.n.checked_sub(1)? } else { self.n };
        (divisor > 0).then(|| self.m2 / divisor as f64)
    }
}

/// Incremental state for every `AggregationType` of one value field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateAccumulator {
    /// Non-empty values, numeric or not.
    entries: u64,
    sum: f64,
    /// (min, max) of the numbers.
    range: Option<(f64, f64)>,
    product: Option<f64>,
    moments: Moments,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, observation: Observation) {
        self.entries += 1;
        if let Observation::Number(x) = observation {
            self.sum += x;
            self.range = Some(self.range.map_or((x, x), |(lo, hi)| (lo.min(x), hi.max(x))));
            self.product = Some(self.product.map_or(x, |p| p * x));
            self.moments.push(x);
        }
    }

    pub fn add_number(&mut self, x: f64) {
        self.observe(Observation::Number(x));
    }

    /// Numbers seen so far.
    pub fn numbers(&self) -> u64 {
        self.moments.n
    }

    /// The aggregate as a cell. Counts and sums of nothing are 0; the other
    /// aggregations have no value without numbers and give `Empty`.
    pub fn compute(&self, aggregation: AggregationType) -> CellValue {
        let n = self.moments.n;
        let value = match aggregation {
            AggregationType::Sum => Some(self.sum),
            AggregationType::Count => Some(self.entries as f64),
            AggregationType::CountNumbers => Some(n as f64),
            AggregationType::Average => (n > 0).then(|| self.sum / n as f64),
            AggregationType::Min => self.range.map(|(lo, _)| lo),
            AggregationType::Max => self.range.map(|(_, hi)| hi),
            AggregationType::Product => self.product,
            AggregationType::Var => self.moments.variance(true),
            AggregationType::VarP => self.moments.variance(false),
            AggregationType::StdDev => self.moments.variance(true).map(f64::sqrt),
            AggregationType::StdDevP => self.moments.variance(false).map(f64::sqrt),
        };
        value.map_or(CellValue::Empty, CellValue::Number)
    }
}

// ============================================================================
// PIVOT CACHE
// ============================================================================

/// Accumulators for one (row, column) cell, one per value field.
pub type CellAccumulators = Vec<AggregateAccumulator>;

/// Records grouped by row and column fields. Cells, row totals, column
/// totals and the grand total are all filled during the single scan.
#[derive(Debug, Clone)]
pub struct PivotCache {
    row_fields: Vec<FieldCache>,
    column_fields: Vec<FieldCache>,
    row_keys: Vec<GroupKey>,
    column_keys: Vec<GroupKey>,
    cells: FxHashMap<(GroupKey, GroupKey), CellAccumulators>,
    row_totals: FxHashMap<GroupKey, CellAccumulators>,
    column_totals: FxHashMap<GroupKey, CellAccumulators>,
    grand_total: CellAccumulators,
    record_count: usize,
    skipped_count: usize,
}

fn field_name(records: &Table, index: FieldIndex) -> String {
    records
        .columns()
        .label(index)
        .map(|label| label[0].to_text())
        .unwrap_or_default()
}

fn observe_all(accumulators: &mut CellAccumulators, observations: &[Option<Observation>]) {
    for (acc, observation) in accumulators.iter_mut().zip(observations) {
        if let Some(observation) = observation {
            acc.observe(*observation);
        }
    }
}

impl PivotCache {
    /// Scans `records` once. Records with an empty row or column field value
    /// are left out of every group and every total.
    pub fn build(
        records: &Table,
        row_fields: &[FieldIndex],
        column_fields: &[FieldIndex],
        value_fields: &[FieldIndex],
        aggregation: AggregationType,
    ) -> TableResult<Self> {
        let caches = |fields: &[FieldIndex]| -> Vec<FieldCache> {
            fields
                .iter()
                .map(|&f| FieldCache::new(f, field_name(records, f)))
                .collect()
        };
        let blank = vec![AggregateAccumulator::new(); value_fields.len()];
        let mut cache = PivotCache {
            row_fields: caches(row_fields),
            column_fields: caches(column_fields),
            row_keys: Vec::new(),
            column_keys: Vec::new(),
            cells: FxHashMap::default(),
            row_totals: FxHashMap::default(),
            column_totals: FxHashMap::default(),
            grand_total: blank.clone(),
            record_count: records.row_count(),
            skipped_count: 0,
        };
        let value_names: Vec<String> = value_fields.iter().map(|&f| field_name(records, f)).collect();

        let mut seen_rows: FxHashSet<GroupKey> = FxHashSet::default();
        let mut seen_columns: FxHashSet<GroupKey> = FxHashSet::default();

        for (r, record) in records.values().iter().enumerate() {
            let (Some(row_key), Some(column_key)) = (
                intern_key(&mut cache.row_fields, record),
                intern_key(&mut cache.column_fields, record),
            ) else {
                trace!("record {} has an empty grouping value; skipped", r);
                cache.skipped_count += 1;
                continue;
            };

            let observations = value_fields
                .iter()
                .zip(&value_names)
                .map(|(&field, name)| Observation::from_cell(&record[field], aggregation, name))
                .collect::<TableResult<Vec<_>>>()?;

            observe_all(
                cache
                    .cells
                    .entry((row_key.clone(), column_key.clone()))
                    .or_insert_with(|| blank.clone()),
                &observations,
            );
            observe_all(
                cache.row_totals.entry(row_key.clone()).or_insert_with(|| blank.clone()),
                &observations,
            );
            observe_all(
                cache.column_totals.entry(column_key.clone()).or_insert_with(|| blank.clone()),
                &observations,
            );
            observe_all(&mut cache.grand_total, &observations);

            if seen_rows.insert(row_key.clone()) {
                cache.row_keys.push(row_key);
            }
            if seen_columns.insert(column_key.clone()) {
                cache.column_keys.push(column_key);
            }
        }

        Ok(cache)
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Records left out because a grouping value was empty.
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    /// Distinct row combinations, ascending by value.
    pub fn sorted_row_keys(&self) -> Vec<GroupKey> {
        sorted_keys(&self.row_fields, &self.row_keys)
    }

    /// Distinct column combinations, ascending by value.
    pub fn sorted_column_keys(&self) -> Vec<GroupKey> {
        sorted_keys(&self.column_fields, &self.column_keys)
    }

    pub fn row_values(&self, key: &GroupKey) -> Vec<LevelValue> {
        resolve_key(&self.row_fields, key)
    }

    pub fn column_values(&self, key: &GroupKey) -> Vec<LevelValue> {
        resolve_key(&self.column_fields, key)
    }

    /// Accumulators of one cell, `None` if no record fell into it.
    pub fn cell(&self, row: &GroupKey, column: &GroupKey) -> Option<&CellAccumulators> {
        self.cells.get(&(row.clone(), column.clone()))
    }

    /// All records of one row combination.
    pub fn row_total(&self, row: &GroupKey) -> Option<&CellAccumulators> {
        self.row_totals.get(row)
    }

    /// All records of one column combination.
    pub fn column_total(&self, column: &GroupKey) -> Option<&CellAccumulators> {
        self.column_totals.get(column)
    }

    /// Every record that was not skipped.
    pub fn grand_total(&self) -> &CellAccumulators {
        &self.grand_total
    }
}

/// Interns one record's values for `fields`; `None` if any of them is empty.
fn intern_key(fields: &mut [FieldCache], record: &[CellValue]) -> Option<GroupKey> {
    let mut key = GroupKey::new();
    for field in fields.iter_mut() {
        let value = &record[field.source_index];
        if value.is_empty() {
            return None;
        }
        key.push(field.intern(LevelValue::from(value)));
    }
    Some(key)
}

fn resolve_key(fields: &[FieldCache], key: &GroupKey) -> Vec<LevelValue> {
    fields
        .iter()
        .zip(key.iter())
        .map(|(field, &id)| field.get_value(id).cloned().unwrap_or(LevelValue::Empty))
        .collect()
}

fn sorted_keys(fields: &[FieldCache], keys: &[GroupKey]) -> Vec<GroupKey> {
    let ranks: Vec<Vec<u32>> = fields.iter().map(FieldCache::sort_ranks).collect();
    let mut sorted = keys.to_vec();
    sorted.sort_by(|a, b| {
        let rank_a = a.iter().zip(&ranks).map(|(&id, r)| r[id as usize]);
        let rank_b = b.iter().zip(&ranks).map(|(&id, r)| r[id as usize]);
        rank_a.cmp(rank_b)
    });
    sorted
}
