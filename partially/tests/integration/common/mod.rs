use partially::{ConstructionError, PartialConvertible, PartialValue};

#[derive(Clone, Debug, PartialEq)]
pub struct Embedded {
    pub string: String,
}

partially::fields! {
    Embedded {
        pub STRING: String => string,
    }
}

impl PartialConvertible for Embedded {
    fn from_partial(partial: &PartialValue<Self>) -> Result<Self, ConstructionError> {
        Ok(Embedded {
            string: partial.get(Embedded::STRING)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Wrapped {
    pub a: String,
    pub b: Option<String>,
    pub embedded: Embedded,
}

partially::fields! {
    Wrapped {
        pub A: String => a,
        pub B: Option<String> => b,
        pub EMBEDDED: Embedded => embedded,
    }
}

impl PartialConvertible for Wrapped {
    fn from_partial(partial: &PartialValue<Self>) -> Result<Self, ConstructionError> {
        Ok(Wrapped {
            a: partial.get(Wrapped::A)?,
            b: partial.get_optional(Wrapped::B)?,
            embedded: partial.get(Wrapped::EMBEDDED)?,
        })
    }
}

pub fn backing() -> Wrapped {
    Wrapped {
        a: "backing a".into(),
        b: Some("backing b".into()),
        embedded: Embedded {
            string: "backing string".into(),
        },
    }
}
