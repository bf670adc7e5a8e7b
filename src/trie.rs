//! Character trie over command names
//!
//! Command names may span several words ("config show", "config set").
//! Storing them per character lets one walk answer three questions:
//! exact lookup, "which names start with this prefix", and "what is the
//! longest registered name at the front of this token sequence".
//!
//! Children keep insertion order, so every traversal is deterministic.

/// A registered name together with its payload
#[derive(Debug)]
struct Terminal<V> {
    name: String,
    value: V,
}

#[derive(Debug)]
struct TrieNode<V> {
    letter: char,
    children: Vec<TrieNode<V>>,
    terminal: Option<Terminal<V>>,
}

impl<V> TrieNode<V> {
    fn new(letter: char) -> Self {
        Self {
            letter,
            children: Vec::new(),
            terminal: None,
        }
    }

    fn child(&self, letter: char) -> Option<&TrieNode<V>> {
        self.children.iter().find(|c| c.letter == letter)
    }

    fn child_mut(&mut self, letter: char) -> Option<&mut TrieNode<V>> {
        self.children.iter_mut().find(|c| c.letter == letter)
    }

    fn is_prunable(&self) -> bool {
        self.children.is_empty() && self.terminal.is_none()
    }

    /// Follow `path` one character at a time
    fn walk(&self, path: &str) -> Option<&TrieNode<V>> {
        path.chars().try_fold(self, |node, c| node.child(c))
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Terminal<V>>) {
        if let Some(terminal) = &self.terminal {
            out.push(terminal);
        }
        for child in &self.children {
            child.collect(out);
        }
    }
}

/// Prefix tree mapping command names to values
#[derive(Debug)]
pub struct CommandTrie<V> {
    root: TrieNode<V>,
    len: usize,
}

impl<V> Default for CommandTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CommandTrie<V> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new('\0'),
            len: 0,
        }
    }

    /// Insert `name`, returning the value it previously held
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        let mut node = &mut self.root;
        for c in name.chars() {
            let index = match node.children.iter().position(|child| child.letter == c) {
                Some(index) => index,
                None => {
                    node.children.push(TrieNode::new(c));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }

        let previous = node.terminal.replace(Terminal { name, value });
        if previous.is_none() {
            self.len += 1;
        }
        previous.map(|t| t.value)
    }

    /// Exact lookup
    pub fn get(&self, name: &str) -> Option<&V> {
        self.root
            .walk(name)
            .and_then(|node| node.terminal.as_ref())
            .map(|t| &t.value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let mut node = &mut self.root;
        for c in name.chars() {
            node = node.child_mut(c)?;
        }
        node.terminal.as_mut().map(|t| &mut t.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove `name` and prune nodes that no longer lead anywhere
    ///
    /// Removing a name that is not stored is a silent no-op returning `None`.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let removed = remove_path(&mut self.root, name.chars());
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Every value whose name starts with `prefix`, in pre-order
    ///
    /// An empty prefix lists the whole trie.
    pub fn suggestions(&self, prefix: &str) -> Vec<&V> {
        let mut terminals = Vec::new();
        if let Some(node) = self.root.walk(prefix) {
            node.collect(&mut terminals);
        }
        terminals.into_iter().map(|t| &t.value).collect()
    }

    /// Names and values of the whole trie, in pre-order
    pub fn entries(&self) -> Vec<(&str, &V)> {
        let mut terminals = Vec::new();
        self.root.collect(&mut terminals);
        terminals
            .into_iter()
            .map(|t| (t.name.as_str(), &t.value))
            .collect()
    }

    pub fn values(&self) -> Vec<&V> {
        self.suggestions("")
    }

    /// Greedy longest match of a registered name against the front of `tokens`
    ///
    /// Tokens are joined with single spaces one at a time for as long as the
    /// joined text is itself a registered name. The first extension that is
    /// not registered ends the walk, so `net if up` is unreachable unless
    /// `net` and `net if` are registered too. Returns the value and the
    /// number of tokens it consumed.
    pub fn resolve_prefix<S: AsRef<str>>(&self, tokens: &[S]) -> Option<(&V, usize)> {
        let mut node = &self.root;
        let mut best = None;

        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                match node.child(' ') {
                    Some(next) => node = next,
                    None => break,
                }
            }
            match node.walk(token.as_ref()) {
                Some(next) => node = next,
                None => break,
            }
            match &node.terminal {
                Some(terminal) => best = Some((&terminal.value, i + 1)),
                None => break,
            }
        }

        best
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn remove_path<V>(node: &mut TrieNode<V>, mut path: std::str::Chars<'_>) -> Option<V> {
    let Some(c) = path.next() else {
        return node.terminal.take().map(|t| t.value);
    };

    let index = node.children.iter().position(|child| child.letter == c)?;
    let removed = remove_path(&mut node.children[index], path)?;
    if node.children[index].is_prunable() {
        node.children.remove(index);
    }
    Some(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn trie_of(names: &[&'static str]) -> CommandTrie<&'static str> {
        let mut trie = CommandTrie::new();
        for name in names {
            trie.insert(*name, *name);
        }
        trie
    }

    #[test]
    fn test_exact_lookup() {
        let trie = trie_of(&["command", "command2"]);
        assert_eq!(trie.get("command"), Some(&"command"));
        assert_eq!(trie.get("command2"), Some(&"command2"));
        assert_eq!(trie.get("comm"), None);
        assert_eq!(trie.get("test"), None);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut trie = CommandTrie::new();
        assert_eq!(trie.insert("a", 1), None);
        assert_eq!(trie.insert("a", 2), Some(1));
        assert_eq!(trie.get("a"), Some(&2));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_longest_match_wins() {
        let trie = trie_of(&["a", "a b"]);
        let tokens = ["a", "b", "c"];
        assert_eq!(trie.resolve_prefix(&tokens), Some((&"a b", 2)));
        assert_eq!(&tokens[2..], &["c"]);
    }

    #[test]
    fn test_resolve_falls_back_to_shorter() {
        let trie = trie_of(&["config", "config show"]);
        assert_eq!(trie.resolve_prefix(&["config", "set", "x"]), Some((&"config", 1)));
        assert_eq!(trie.resolve_prefix(&["config", "sh"]), Some((&"config", 1)));
        assert_eq!(trie.resolve_prefix(&["conf"]), None);
        assert_eq!(trie.resolve_prefix::<&str>(&[]), None);
    }

    #[test]
    fn test_resolve_stops_at_first_unregistered_extension() {
        let trie = trie_of(&["net", "net if up"]);
        assert_eq!(trie.resolve_prefix(&["net", "if", "up", "eth0"]), Some((&"net", 1)));
        assert_eq!(trie.resolve_prefix(&["net", "if", "down"]), Some((&"net", 1)));
    }

    #[test]
    fn test_resolve_needs_registered_first_word() {
        let trie = trie_of(&["net if", "net if up"]);
        assert_eq!(trie.resolve_prefix(&["net", "if", "up"]), None);
        assert_eq!(trie.get("net if up"), Some(&"net if up"));
    }

    #[test]
    fn test_resolve_walks_registered_chain() {
        let trie = trie_of(&["net", "net if", "net if up"]);
        assert_eq!(trie.resolve_prefix(&["net", "if", "up", "eth0"]), Some((&"net if up", 3)));
        assert_eq!(trie.resolve_prefix(&["net", "if", "eth0"]), Some((&"net if", 2)));
    }

    #[test]
    fn test_resolve_does_not_match_partial_word() {
        let trie = trie_of(&["cmdsub"]);
        assert_eq!(trie.resolve_prefix(&["cmd", "sub"]), None);
    }

    #[test]
    fn test_suggestions_in_insertion_order() {
        let trie = trie_of(&["test", "test subcommand", "other"]);
        assert_eq!(trie.suggestions("test"), vec![&"test", &"test subcommand"]);
        assert_eq!(trie.suggestions("tst"), Vec::<&&str>::new());
        assert_eq!(trie.suggestions(""), vec![&"test", &"test subcommand", &"other"]);
    }

    #[test]
    fn test_remove_prunes_only_dead_branches() {
        let mut trie = trie_of(&["cmd", "cmdsub", "cmd sub", "cmd sub c", "cmd set", "sub"]);

        assert_eq!(trie.remove("cmdsub"), Some("cmdsub"));
        assert_eq!(trie.remove("cmd sub"), Some("cmd sub"));
        assert_eq!(trie.remove("sub"), Some("sub"));

        assert_eq!(trie.suggestions("cmd"), vec![&"cmd", &"cmd sub c", &"cmd set"]);
        assert!(trie.suggestions("sub").is_empty());
        assert_eq!(trie.len(), 3);
        assert!(trie.root.child('s').is_none());
    }

    #[test]
    fn test_remove_longer_name_keeps_prefix() {
        let mut trie = trie_of(&["a", "a b"]);
        trie.remove("a b");
        assert_eq!(trie.resolve_prefix(&["a", "b", "c"]), Some((&"a", 1)));
        assert_eq!(trie.suggestions("a"), vec![&"a"]);
        assert!(trie.root.child('a').unwrap().children.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut trie = trie_of(&["command"]);
        assert_eq!(trie.remove("cmmand"), None);
        assert_eq!(trie.remove("comm"), None);
        assert_eq!(trie.remove("commands"), None);
        assert_eq!(trie.suggestions("com"), vec![&"command"]);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut trie = CommandTrie::new();
        trie.insert("x", vec![1]);
        trie.get_mut("x").unwrap().push(2);
        assert_eq!(trie.get("x"), Some(&vec![1, 2]));
        assert!(trie.get_mut("y").is_none());
    }

    proptest! {
        #[test]
        fn removal_leaves_other_names_intact(names in prop::collection::btree_set("[a-c]{1,3}( [a-c]{1,2})?", 1..12),
                                             pick in any::<prop::sample::Index>()) {
            let names: Vec<String> = names.into_iter().collect();
            let mut trie = CommandTrie::new();
            for name in &names {
                trie.insert(name.clone(), name.clone());
            }
            let victim = pick.get(&names).clone();
            prop_assert_eq!(trie.remove(&victim), Some(victim.clone()));
            prop_assert_eq!(trie.len(), names.len() - 1);
            for name in names.iter().filter(|n| **n != victim) {
                prop_assert_eq!(trie.get(name), Some(name));
            }
            prop_assert!(trie.get(&victim).is_none());
        }

        #[test]
        fn resolve_finds_every_prefix_closed_name(names in prop::collection::btree_set("[a-c]{1,3}( [a-c]{1,2}){0,2}", 1..10)) {
            let mut trie = CommandTrie::new();
            for name in &names {
                trie.insert(name.clone(), name.clone());
            }
            for name in &names {
                let tokens: Vec<&str> = name.split(' ').collect();
                let registered_prefixes = (1..=tokens.len())
                    .take_while(|n| trie.contains(&tokens[..*n].join(" ")))
                    .count();
                match trie.resolve_prefix(&tokens) {
                    Some((found, consumed)) => {
                        prop_assert_eq!(consumed, registered_prefixes);
                        prop_assert_eq!(found, &tokens[..consumed].join(" "));
                    }
                    None => prop_assert_eq!(registered_prefixes, 0),
                }
                if registered_prefixes == tokens.len() {
                    prop_assert_eq!(trie.resolve_prefix(&tokens).map(|(f, _)| f), Some(name));
                }
            }
        }
    }
}
