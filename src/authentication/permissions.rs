use warp::http::Method;

use crate::schema::AttrKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Recipe,
    Tag,
    Ingredient,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Recipe => "recipes",
            Resource::Tag => "tags",
            Resource::Ingredient => "ingredients",
        }
    }
}

impl From<AttrKind> for Resource {
    fn from(value: AttrKind) -> Self {
        match value {
            AttrKind::Tag => Resource::Tag,
            AttrKind::Ingredient => Resource::Ingredient,
        }
    }
}

const ACTION_TABLE: &[(Resource, &[Action])] = &[
    (
        Resource::Recipe,
        &[
            Action::List,
            Action::Retrieve,
            Action::Create,
            Action::Update,
            Action::PartialUpdate,
            Action::Destroy,
        ],
    ),
    (
        Resource::Tag,
        &[
            Action::List,
            Action::Update,
            Action::PartialUpdate,
            Action::Destroy,
        ],
    ),
    (
        Resource::Ingredient,
        &[
            Action::List,
            Action::Update,
            Action::PartialUpdate,
            Action::Destroy,
        ],
    ),
];

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    /// Maps an HTTP method on a collection (`detail == false`) or on a
    /// single row to the action it requests. `HEAD` is served as `GET`.
    pub fn resolve(method: &Method, detail: bool) -> Option<Self> {
        match (detail, method.as_str()) {
            (false, "GET" | "HEAD") => Some(Action::List),
            (false, "POST") => Some(Action::Create),
            (true, "GET" | "HEAD") => Some(Action::Retrieve),
            (true, "PUT") => Some(Action::Update),
            (true, "PATCH") => Some(Action::PartialUpdate),
            (true, "DELETE") => Some(Action::Destroy),
            _ => None,
        }
    }

    pub fn permitted(self, resource: Resource) -> bool {
        ACTION_TABLE
            .iter()
            .find_map(|(r, actions)| {
                if *r != resource {
                    return None;
                }

                Some(actions.contains(&self))
            })
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
        }
    }
}
