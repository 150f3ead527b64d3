//! A single IR operation as read from the log.
//!
//! Operations are created once by the fragment parser. Only the guard
//! linkage (`bridge`, `percentage`) is filled in later, by
//! [`LoopStorage::reconnect_loops`](crate::storage::LoopStorage::reconnect_loops).

use crate::storage::FragmentId;
use crate::utils::config::{DEBUG_MERGE_POINT, GUARD_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static GUARD_NO_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"Guard(\d+)").unwrap());

/// One operation of a trace fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation kind, e.g. "int_add" or "guard_true"
    pub name: String,

    /// Operand references, in order (descriptor excluded)
    pub args: Vec<String>,

    /// Result variable, if the operation produces one
    pub result: Option<String>,

    /// Free-form descriptor text (`descr=<...>`)
    pub descr: Option<String>,

    /// Values kept alive for a failing guard (`[p0, i1]` suffix)
    pub fail_args: Option<Vec<String>>,

    /// Bridge entered when this guard fails
    pub bridge: Option<FragmentId>,

    /// Share of the owning fragment's executions that took the bridge
    pub percentage: Option<u64>,
}

impl Operation {
    /// Create an operation with no result or descriptor
    ///
    /// **Public** - constructor
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            result: None,
            descr: None,
            fail_args: None,
            bridge: None,
            percentage: None,
        }
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn with_descr(mut self, descr: impl Into<String>) -> Self {
        self.descr = Some(descr.into());
        self
    }

    /// True for every `guard_*` operation
    pub fn is_guard(&self) -> bool {
        self.name.starts_with(GUARD_PREFIX)
    }

    /// True for `debug_merge_point` markers
    pub fn is_merge_point(&self) -> bool {
        self.name == DEBUG_MERGE_POINT
    }

    /// Guard number encoded in the descriptor (`<Guard18>` -> 18)
    ///
    /// **Public** - used by the bridge resolver and the bridge splicer
    ///
    /// # Returns
    /// None for non-guards and for guards whose descriptor carries no number
    pub fn guard_no(&self) -> Option<u32> {
        if !self.is_guard() {
            return None;
        }
        let descr = self.descr.as_deref()?;
        GUARD_NO_REGEX
            .captures(descr)
            .and_then(|caps| caps[1].parse().ok())
    }

    /// Readable rendering of the operation
    ///
    /// **Public** - used by the text renderer
    ///
    /// Comparisons and arithmetic become infix (`i9 = i7 < 1003`), guards
    /// state their condition (`guard(i9 is true)`) and field accesses read
    /// as casts (`i13 = ((pypysig_long_struct)151937600).value`). Anything
    /// else, or anything whose operands don't fit the pattern, falls back
    /// to the raw form.
    pub fn friendly_repr(&self) -> String {
        self.readable().unwrap_or_else(|| self.to_string())
    }

    fn readable(&self) -> Option<String> {
        let arg = |i: usize| self.args.get(i).map(String::as_str);

        if let Some(symbol) = infix_symbol(&self.name) {
            return Some(format!("{} = {} {} {}", self.result.as_ref()?, arg(0)?, symbol, arg(1)?));
        }

        let condition = match self.name.as_str() {
            "guard_true" => Some(format!("{} is true", arg(0)?)),
            "guard_false" => Some(format!("{} is false", arg(0)?)),
            "guard_value" => Some(format!("{} is {}", arg(0)?, arg(1)?)),
            "guard_isnull" => Some(format!("{} is null", arg(0)?)),
            _ => None,
        };
        if let Some(condition) = condition {
            return Some(format!("guard({})", condition));
        }

        match self.name.as_str() {
            "getfield_raw" => {
                let (class, field) = self.field_descr()?;
                Some(format!("{} = (({}){}).{}", self.result.as_ref()?, class, arg(0)?, raw_field(field)))
            }
            "getfield_gc" | "getfield_gc_pure" => {
                let (class, field) = self.field_descr()?;
                Some(format!("{} = (({}){}).{}", self.result.as_ref()?, class, arg(0)?, field))
            }
            "setfield_raw" => {
                let (class, field) = self.field_descr()?;
                Some(format!("(({}){}).{} = {}", class, arg(0)?, raw_field(field), arg(1)?))
            }
            "setfield_gc" => {
                let (class, field) = self.field_descr()?;
                Some(format!("(({}){}).{} = {}", class, arg(0)?, field, arg(1)?))
            }
            _ => None,
        }
    }

    /// Class and field from a field descriptor
    /// (`<SignedFieldDescr pypysig_long_struct.c_value 0>` -> `pypysig_long_struct`, `c_value`)
    fn field_descr(&self) -> Option<(&str, &str)> {
        let path = self.descr.as_deref()?.split(' ').nth(1)?;
        path.rsplit_once('.')
    }
}

fn infix_symbol(name: &str) -> Option<&'static str> {
    let symbol = match name {
        "int_eq" | "float_eq" => "==",
        "int_ne" | "float_ne" => "!=",
        "int_gt" => ">",
        "int_lt" => "<",
        "int_le" => "<=",
        "int_ge" => ">=",
        "int_add" | "float_add" => "+",
        "int_sub" | "float_sub" => "-",
        "int_mul" | "float_mul" => "*",
        "int_and" => "&",
        _ => return None,
    };
    Some(symbol)
}

// Raw struct fields carry a "c_" prefix
fn raw_field(field: &str) -> &str {
    field.strip_prefix("c_").unwrap_or(field)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args = self.args.clone();
        if let Some(descr) = &self.descr {
            args.push(format!("descr={}", descr));
        }
        if let Some(result) = &self.result {
            write!(f, "{} = ", result)?;
        }
        write!(f, "{}({})", self.name, args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_no_from_descr() {
        let op = Operation::new("guard_true", vec!["i9".to_string()]).with_descr("<Guard18>");
        assert!(op.is_guard());
        assert_eq!(op.guard_no(), Some(18));
    }

    #[test]
    fn test_guard_no_requires_guard() {
        let op = Operation::new("int_add", vec![]).with_descr("<Guard3>");
        assert_eq!(op.guard_no(), None);

        let bare = Operation::new("guard_false", vec!["v0".to_string()]);
        assert_eq!(bare.guard_no(), None);
    }

    #[test]
    fn test_display() {
        let op = Operation::new("int_lt", vec!["i7".to_string(), "1003".to_string()])
            .with_result("i9");
        assert_eq!(op.to_string(), "i9 = int_lt(i7, 1003)");

        let guard = Operation::new("guard_true", vec!["i9".to_string()]).with_descr("<Guard2>");
        assert_eq!(guard.to_string(), "guard_true(i9, descr=<Guard2>)");
    }

    #[test]
    fn test_friendly_repr() {
        let fragment = crate::parser::parse_fragment(
            "
            [i7]
            i9 = int_lt(i7, 1003)
            guard_true(i9, descr=<Guard2>) []
            i13 = getfield_raw(151937600, descr=<SignedFieldDescr pypysig_long_struct.c_value 0>)
            ",
        )
        .unwrap();
        let ops = &fragment.operations;

        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].friendly_repr(), "i9 = i7 < 1003");
        assert_eq!(ops[1].friendly_repr(), "guard(i9 is true)");
        assert_eq!(ops[2].friendly_repr(), "i13 = ((pypysig_long_struct)151937600).value");
    }

    #[test]
    fn test_friendly_repr_fields_and_fallback() {
        let set = Operation::new("setfield_gc", vec!["p0".to_string(), "i3".to_string()])
            .with_descr("<FieldDescr pypy.objspace.W_IntObject.inst_intval 8>");
        assert_eq!(set.friendly_repr(), "((pypy.objspace.W_IntObject)p0).inst_intval = i3");

        let null = Operation::new("guard_isnull", vec!["p5".to_string()]).with_descr("<Guard7>");
        assert_eq!(null.friendly_repr(), "guard(p5 is null)");

        let call = Operation::new("call", vec!["p1".to_string()]).with_result("p2");
        assert_eq!(call.friendly_repr(), "p2 = call(p1)");

        // no result to assign to
        let add = Operation::new("int_add", vec!["i0".to_string(), "1".to_string()]);
        assert_eq!(add.friendly_repr(), "int_add(i0, 1)");
    }
}
