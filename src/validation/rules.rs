use lazy_static::lazy_static;
use regex::Regex;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const NAME_MIN_LENGTH: usize = 1;
pub const NAME_MAX_LENGTH: usize = 50;

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub const MSG_NAME_TOO_SHORT: &str = "Provided value is too short (min 1 character(s))";
pub const MSG_NAME_TOO_LONG: &str = "Provided value is too long (max 50 character(s))";

/// A single constraint on a string field. Lengths count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Email { message: &'static str },
    MinChars { min: usize, message: &'static str },
    MaxChars { max: usize, message: &'static str },
}

impl Rule {
    /// Returns the rule's message when `value` violates it.
    pub fn check(&self, value: &str) -> Option<&'static str> {
        match *self {
            Rule::Email { message } => (!is_valid_email(value)).then_some(message),
            Rule::MinChars { min, message } => (value.chars().count() < min).then_some(message),
            Rule::MaxChars { max, message } => (value.chars().count() > max).then_some(message),
        }
    }
}

/// Constraints for one named form field. Every field in a schema is required.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

const EMAIL_RULES: &[Rule] = &[Rule::Email {
    message: MSG_INVALID_EMAIL,
}];

const NAME_RULES: &[Rule] = &[
    Rule::MaxChars {
        max: NAME_MAX_LENGTH,
        message: MSG_NAME_TOO_LONG,
    },
    Rule::MinChars {
        min: NAME_MIN_LENGTH,
        message: MSG_NAME_TOO_SHORT,
    },
];

const PASSWORD_RULES: &[Rule] = &[Rule::MinChars {
    min: PASSWORD_MIN_LENGTH,
    message: MSG_PASSWORD_TOO_SHORT,
}];

pub static LOGIN_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "email",
            rules: EMAIL_RULES,
        },
        FieldSpec {
            name: "password",
            rules: &[],
        },
    ],
};

pub static REGISTER_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "firstName",
            rules: NAME_RULES,
        },
        FieldSpec {
            name: "lastName",
            rules: NAME_RULES,
        },
        FieldSpec {
            name: "email",
            rules: EMAIL_RULES,
        },
        FieldSpec {
            name: "password",
            rules: PASSWORD_RULES,
        },
        FieldSpec {
            name: "confirmPassword",
            rules: PASSWORD_RULES,
        },
    ],
};

pub static INVITATION_SCHEMA: Schema = Schema {
    fields: &[FieldSpec {
        name: "email",
        rules: EMAIL_RULES,
    }],
};

/// Non-empty local and domain parts around a single `@`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
