use super::Value;
use crate::Rc;
use ecow::EcoString;
use hashbrown::HashMap;

/// Bindings captured by closures and structure instances.
///
/// Scopes are immutable once shared; a lookup walks from the innermost scope
/// to the outermost.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: HashMap<EcoString, Value>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new(bindings: HashMap<EcoString, Value>, parent: Option<Rc<Scope>>) -> Self {
        Self { bindings, parent }
    }

    pub fn root() -> Rc<Scope> {
        Rc::new(Scope::default())
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.bindings.get(name) {
                return Some(value);
            }
            scope = scope.parent.as_deref()?;
        }
    }

    pub fn bindings(&self) -> &HashMap<EcoString, Value> {
        &self.bindings
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_walks_outward() {
        let mut outer = HashMap::new();
        outer.insert(EcoString::from("x"), Value::number(1.0));
        outer.insert(EcoString::from("y"), Value::number(2.0));
        let outer = Rc::new(Scope::new(outer, None));

        let mut inner = HashMap::new();
        inner.insert(EcoString::from("x"), Value::number(10.0));
        let inner = Scope::new(inner, Some(outer));

        assert_eq!(inner.lookup("x"), Some(&Value::number(10.0)));
        assert_eq!(inner.lookup("y"), Some(&Value::number(2.0)));
        assert_eq!(inner.lookup("z"), None);
    }
}
