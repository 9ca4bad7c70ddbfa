//! The SAML subject model that filter expressions are evaluated against.
//!
//! A subject is what an identity provider asserts about an authenticated user:
//! who issued the assertion, the user's name identifier, and a set of named
//! attributes. Each type is exposed to expressions as an [`Object`], so that
//! filters can be written as
//! `subject.attribute_statement.attributes['uid'].values[0] == 'student1'`.

use pyexpr_runtime::{Class, ForeignFn, Object, Table, Value};
use serde::Deserialize;
use std::{collections::BTreeMap, rc::Rc};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Subject {
    /// Entity ID of the identity provider that issued the assertion.
    pub idp: String,

    #[serde(default)]
    pub name_id: Option<NameId>,

    #[serde(default)]
    pub attribute_statement: Option<AttributeStatement>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct NameId {
    #[serde(default)]
    pub name_format: Option<String>,

    #[serde(default)]
    pub name_qualifier: Option<String>,

    #[serde(default)]
    pub sp_name_qualifier: Option<String>,

    pub name_id: String,
}

/// Attributes asserted about a subject, by name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(from = "AttributeList")]
pub struct AttributeStatement {
    pub attributes: BTreeMap<String, Attribute>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Attribute {
    pub name: String,

    #[serde(default)]
    pub friendly_name: Option<String>,

    #[serde(default)]
    pub values: Vec<String>,
}

/// Attribute statements are written as a list of attributes.
#[derive(Deserialize)]
struct AttributeList {
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl From<AttributeList> for AttributeStatement {
    fn from(list: AttributeList) -> Self {
        Self::new(list.attributes)
    }
}

impl Subject {
    pub const CLASS: Class = Class::new("Subject");

    pub fn new(idp: impl Into<String>) -> Self {
        Self {
            idp: idp.into(),
            ..Self::default()
        }
    }

    pub fn with_name_id(mut self, name_id: NameId) -> Self {
        self.name_id = Some(name_id);
        self
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attribute_statement = Some(AttributeStatement::new(attributes));
        self
    }

    /// The classes of every object reachable from a subject.
    pub fn classes() -> [Class; 4] {
        [Subject::CLASS, NameId::CLASS, AttributeStatement::CLASS, Attribute::CLASS]
    }
}

impl NameId {
    pub const CLASS: Class = Class::new("NameId");

    pub fn new(name_id: impl Into<String>) -> Self {
        Self {
            name_id: name_id.into(),
            ..Self::default()
        }
    }
}

impl AttributeStatement {
    pub const CLASS: Class = Class::new("AttributeStatement");

    /// Index attributes by name. Later attributes replace earlier attributes
    /// of the same name.
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|attribute| (attribute.name.clone(), attribute))
                .collect(),
        }
    }
}

impl Attribute {
    pub const CLASS: Class = Class::new("Attribute");

    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

fn optional_str(value: &Option<String>) -> Value {
    value.as_deref().into()
}

impl Object for Subject {
    fn class(&self) -> Class {
        Subject::CLASS
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        Some(match name {
            "idp" => self.idp.as_str().into(),
            "name_id" => self.name_id.clone().map(Rc::new).into(),
            "attribute_statement" => self.attribute_statement.clone().map(Rc::new).into(),
            _ => return None,
        })
    }
}

impl Object for NameId {
    fn class(&self) -> Class {
        NameId::CLASS
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        Some(match name {
            "name_format" => optional_str(&self.name_format),
            "name_qualifier" => optional_str(&self.name_qualifier),
            "sp_name_qualifier" => optional_str(&self.sp_name_qualifier),
            "name_id" => self.name_id.as_str().into(),
            _ => return None,
        })
    }
}

impl Object for AttributeStatement {
    fn class(&self) -> Class {
        AttributeStatement::CLASS
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "attributes" => Some(
                self.attributes
                    .iter()
                    .map(|(name, attribute)| (name.clone(), Rc::new(attribute.clone())))
                    .collect::<Table>()
                    .into(),
            ),
            "get" => {
                // Like `attributes[name]`, but `None` when absent.
                let attributes = self.attributes.clone();
                Some(
                    ForeignFn::method(Self::CLASS, "get", move |args| match args {
                        [Value::String(name)] => Ok(attributes.get(&**name).cloned().map(Rc::new).into()),
                        _ => Err("get() takes exactly one str argument".into()),
                    })
                    .into(),
                )
            },
            _ => None,
        }
    }

    fn item(&self, key: &Value) -> Option<Value> {
        let attribute = self.attributes.get(key.as_str()?)?;
        Some(Rc::new(attribute.clone()).into())
    }
}

impl Object for Attribute {
    fn class(&self) -> Class {
        Attribute::CLASS
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        Some(match name {
            "name" => self.name.as_str().into(),
            "friendly_name" => optional_str(&self.friendly_name),
            "values" => self.values.iter().map(|value| Value::from(value.as_str())).collect(),
            _ => return None,
        })
    }
}
