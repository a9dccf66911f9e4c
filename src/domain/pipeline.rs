//! Billing aggregation over order line items.
//!
//! A pipeline is a fixed list of stages: match the requested line items,
//! left-join food, order and table (the table through the joined order), project
//! each row to its billing fields, group by `(order_id, table_id, table_number)`
//! and shape every group into a [`BillingSummary`].
//!
//! Stores may run the match and lookup stages natively (one query with outer
//! joins) and hand the joined rows to [`AggregationPipeline::finish`]; the
//! in-memory executor [`AggregationPipeline::execute`] runs every stage itself.

use std::collections::HashMap;
use std::hash::Hash;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::records::{Food, Order, OrderLineItem, Table};

// ── Stages ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemFilter {
    /// Every line item in the store.
    All,
    /// Only the line items of one order.
    Order(Uuid),
}

impl LineItemFilter {
    pub fn matches(&self, item: &OrderLineItem) -> bool {
        match self {
            LineItemFilter::All => true,
            LineItemFilter::Order(id) => item.order_id == *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Match(LineItemFilter),
    LookupFood,
    LookupOrder,
    /// Joins on the *order's* `table_id`, so it must follow `LookupOrder`.
    LookupTable,
    Project,
    Group,
    Shape,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::LookupFood => "lookup(food)",
            Stage::LookupOrder => "lookup(order)",
            Stage::LookupTable => "lookup(table)",
            Stage::Project => "project",
            Stage::Group => "group",
            Stage::Shape => "shape",
        }
    }

    fn canonical(filter: LineItemFilter) -> [Stage; 7] {
        [
            Stage::Match(filter),
            Stage::LookupFood,
            Stage::LookupOrder,
            Stage::LookupTable,
            Stage::Project,
            Stage::Group,
            Stage::Shape,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPipeline {
    filter: LineItemFilter,
    stages: Vec<Stage>,
}

impl AggregationPipeline {
    /// Billing summary for the line items of a single order.
    pub fn for_order(order_id: Uuid) -> Self {
        Self::canonical(LineItemFilter::Order(order_id))
    }

    /// Billing summaries for every order that has line items.
    pub fn all_items() -> Self {
        Self::canonical(LineItemFilter::All)
    }

    fn canonical(filter: LineItemFilter) -> Self {
        Self {
            filter,
            stages: Stage::canonical(filter).to_vec(),
        }
    }

    /// Build a pipeline from an explicit stage list.
    ///
    /// Later stages read fields introduced by earlier ones, so only the
    /// canonical order is accepted; anything else is `MalformedQuery`.
    pub fn from_stages(stages: Vec<Stage>) -> Result<Self, DomainError> {
        let filter = match stages.first() {
            Some(Stage::Match(filter)) => *filter,
            Some(other) => {
                return Err(DomainError::MalformedQuery(format!(
                    "pipeline must start with match, found {}",
                    other.name()
                )))
            }
            None => return Err(DomainError::MalformedQuery("empty pipeline".to_string())),
        };

        let expected = Stage::canonical(filter);
        if stages.len() != expected.len() {
            return Err(DomainError::MalformedQuery(format!(
                "expected {} stages, found {}",
                expected.len(),
                stages.len()
            )));
        }
        if let Some((i, (got, want))) = stages
            .iter()
            .zip(expected.iter())
            .enumerate()
            .find(|(_, (got, want))| got != want)
        {
            return Err(DomainError::MalformedQuery(format!(
                "stage {} is {}, expected {}",
                i,
                got.name(),
                want.name()
            )));
        }

        Ok(Self { filter, stages })
    }

    pub fn filter(&self) -> LineItemFilter {
        self.filter
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage against in-memory collections.
    pub fn execute(&self, source: &Collections) -> Result<Vec<BillingSummary>, DomainError> {
        let mut batch = Batch::Start;
        for stage in &self.stages {
            batch = apply(stage, batch, Some(source))?;
        }
        batch.into_summaries()
    }

    /// Run the stages that follow the lookups over rows a store has already
    /// matched and joined.
    pub fn finish(&self, rows: Vec<JoinedLineRow>) -> Result<Vec<BillingSummary>, DomainError> {
        let start = self
            .stages
            .iter()
            .position(|s| *s == Stage::Project)
            .unwrap_or(self.stages.len());
        let mut batch = Batch::Joined(rows);
        for stage in &self.stages[start..] {
            batch = apply(stage, batch, None)?;
        }
        batch.into_summaries()
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FoodRef {
    pub name: String,
    pub price: BigDecimal,
    pub food_image: String,
}

impl From<&Food> for FoodRef {
    fn from(f: &Food) -> Self {
        Self {
            name: f.name.clone(),
            price: f.price.clone(),
            food_image: f.food_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderRef {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
}

impl From<&Order> for OrderRef {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            table_id: o.table_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRef {
    pub id: Uuid,
    pub table_number: i32,
}

impl From<&Table> for TableRef {
    fn from(t: &Table) -> Self {
        Self {
            id: t.id,
            table_number: t.table_number,
        }
    }
}

/// A line item with whatever its lookups matched; `None` where nothing did.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedLineRow {
    pub item: OrderLineItem,
    pub food: Option<FoodRef>,
    pub order: Option<OrderRef>,
    pub table: Option<TableRef>,
}

impl JoinedLineRow {
    fn bare(item: OrderLineItem) -> Self {
        Self {
            item,
            food: None,
            order: None,
            table: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedLine {
    pub amount: Option<BigDecimal>,
    pub total_count: i64,
    pub food_name: Option<String>,
    pub food_image: Option<String>,
    pub table_number: Option<i32>,
    pub table_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub price: Option<BigDecimal>,
    pub quantity: i32,
}

impl ProjectedLine {
    fn group_key(&self) -> GroupKey {
        GroupKey {
            order_id: self.order_id,
            table_id: self.table_id,
            table_number: self.table_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub order_id: Option<Uuid>,
    pub table_id: Option<Uuid>,
    pub table_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingGroup {
    pub key: GroupKey,
    pub payment_due: BigDecimal,
    pub total_count: i64,
    pub order_items: Vec<ProjectedLine>,
}

/// One order's bill. `payment_due` sums the food price of each line; quantity
/// is carried on the lines but does not multiply the price.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingSummary {
    pub payment_due: BigDecimal,
    pub total_count: i64,
    pub table_number: Option<i32>,
    pub order_items: Vec<ProjectedLine>,
}

/// Source collections for [`AggregationPipeline::execute`].
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub line_items: Vec<OrderLineItem>,
    pub foods: Vec<Food>,
    pub orders: Vec<Order>,
    pub tables: Vec<Table>,
}

// ── Execution ─────────────────────────────────────────────────────────────────

enum Batch {
    Start,
    Joined(Vec<JoinedLineRow>),
    Projected(Vec<ProjectedLine>),
    Grouped(Vec<BillingGroup>),
    Shaped(Vec<BillingSummary>),
}

impl Batch {
    fn kind(&self) -> &'static str {
        match self {
            Batch::Start => "nothing",
            Batch::Joined(_) => "joined rows",
            Batch::Projected(_) => "projected rows",
            Batch::Grouped(_) => "groups",
            Batch::Shaped(_) => "summaries",
        }
    }

    fn into_summaries(self) -> Result<Vec<BillingSummary>, DomainError> {
        match self {
            Batch::Shaped(summaries) => Ok(summaries),
            other => Err(DomainError::MalformedQuery(format!(
                "pipeline ended with {} instead of summaries",
                other.kind()
            ))),
        }
    }
}

fn apply(
    stage: &Stage,
    batch: Batch,
    source: Option<&Collections>,
) -> Result<Batch, DomainError> {
    let require_source = || {
        source.ok_or_else(|| {
            DomainError::MalformedQuery(format!("{} needs source collections", stage.name()))
        })
    };

    Ok(match (stage, batch) {
        (Stage::Match(filter), Batch::Start) => Batch::Joined(
            require_source()?
                .line_items
                .iter()
                .filter(|item| filter.matches(item))
                .cloned()
                .map(JoinedLineRow::bare)
                .collect(),
        ),
        (Stage::LookupFood, Batch::Joined(rows)) => Batch::Joined(
            left_outer_join(rows, &require_source()?.foods, |r| Some(r.item.food_id), |f| f.id)
                .into_iter()
                .map(|(mut row, food)| {
                    row.food = food.map(FoodRef::from);
                    row
                })
                .collect(),
        ),
        (Stage::LookupOrder, Batch::Joined(rows)) => Batch::Joined(
            left_outer_join(rows, &require_source()?.orders, |r| Some(r.item.order_id), |o| o.id)
                .into_iter()
                .map(|(mut row, order)| {
                    row.order = order.map(OrderRef::from);
                    row
                })
                .collect(),
        ),
        (Stage::LookupTable, Batch::Joined(rows)) => Batch::Joined(
            left_outer_join(
                rows,
                &require_source()?.tables,
                |r| r.order.and_then(|o| o.table_id),
                |t| t.id,
            )
            .into_iter()
            .map(|(mut row, table)| {
                row.table = table.map(TableRef::from);
                row
            })
            .collect(),
        ),
        (Stage::Project, Batch::Joined(rows)) => {
            Batch::Projected(rows.into_iter().map(project).collect())
        }
        (Stage::Group, Batch::Projected(lines)) => Batch::Grouped(group(lines)),
        (Stage::Shape, Batch::Grouped(groups)) => {
            Batch::Shaped(groups.into_iter().map(shape).collect())
        }
        (stage, batch) => {
            return Err(DomainError::MalformedQuery(format!(
                "{} cannot run on {}",
                stage.name(),
                batch.kind()
            )))
        }
    })
}

/// Pair every left row with the first right row sharing its key. Rows with no
/// key or no match are kept with `None`.
pub fn left_outer_join<'r, L, R, K>(
    left: Vec<L>,
    right: &'r [R],
    left_key: impl Fn(&L) -> Option<K>,
    right_key: impl Fn(&R) -> K,
) -> Vec<(L, Option<&'r R>)>
where
    K: Eq + Hash,
{
    let mut index: HashMap<K, &'r R> = HashMap::with_capacity(right.len());
    for r in right {
        index.entry(right_key(r)).or_insert(r);
    }

    left.into_iter()
        .map(|l| {
            let matched = left_key(&l).and_then(|k| index.get(&k).copied());
            (l, matched)
        })
        .collect()
}

fn project(row: JoinedLineRow) -> ProjectedLine {
    let price = row.food.as_ref().map(|f| f.price.clone());
    ProjectedLine {
        amount: price.clone(),
        total_count: 1,
        food_name: row.food.as_ref().map(|f| f.name.clone()),
        food_image: row.food.map(|f| f.food_image),
        table_number: row.table.map(|t| t.table_number),
        table_id: row.table.map(|t| t.id),
        order_id: row.order.map(|o| o.id),
        price,
        quantity: row.item.quantity,
    }
}

/// Groups come out in the order their first row arrived; rows keep arrival
/// order inside a group. A missing amount adds nothing to `payment_due`.
fn group(lines: Vec<ProjectedLine>) -> Vec<BillingGroup> {
    let mut groups: Vec<BillingGroup> = Vec::new();
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();

    for line in lines {
        let key = line.group_key();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(BillingGroup {
                key,
                payment_due: BigDecimal::from(0),
                total_count: 0,
                order_items: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        if let Some(amount) = &line.amount {
            group.payment_due = &group.payment_due + amount;
        }
        group.total_count += 1;
        group.order_items.push(line);
    }

    groups
}

fn shape(group: BillingGroup) -> BillingSummary {
    BillingSummary {
        payment_due: group.payment_due,
        total_count: group.total_count,
        table_number: group.key.table_number,
        order_items: group.order_items,
    }
}
