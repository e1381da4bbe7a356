use std::cmp::Ordering;

use super::schema::{Recipe, RecipeAttr, Uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderBy {
    IdDesc,
    NameDesc,
}

impl OrderBy {
    pub fn sql(&self) -> &'static str {
        match self {
            OrderBy::IdDesc => "id DESC",
            OrderBy::NameDesc => "name DESC, id DESC",
        }
    }
}

/// Deferred description of a per-user collection. Nothing is read until a
/// store evaluates it, and the same value can be evaluated again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuerySet {
    pub user_id: Uuid,
    pub order: OrderBy,
}

impl QuerySet {
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            user_id,
            order: OrderBy::IdDesc,
        }
    }

    pub fn order_by(self, order: OrderBy) -> Self {
        Self { order, ..self }
    }

    pub fn contains(&self, owner: Uuid) -> bool {
        self.user_id == owner
    }
}

/// In-process evaluation of a `QuerySet` ordering.
pub trait Ordered {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;

    fn compare(&self, other: &Self, order: OrderBy) -> Ordering {
        match order {
            OrderBy::IdDesc => other.id().cmp(&self.id()),
            OrderBy::NameDesc => other
                .name()
                .cmp(self.name())
                .then_with(|| other.id().cmp(&self.id())),
        }
    }
}

impl Ordered for Recipe {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }
}

impl Ordered for RecipeAttr {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
