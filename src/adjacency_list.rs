use std::collections::HashMap;
use core::hash::Hash;




/**
 * A minimal directed graph structure that stores only edges. Each edge
 * carries a payload of type `E`; in the halo plan the vertices are block
 * ranks and the payload describes the region of data moving along the edge.
 * Parallel edges between the same two vertices are allowed and kept in
 * insertion order.
 */
pub struct AdjacencyList<K, E> {
    outgoing: HashMap<K, Vec<(K, E)>>,
    incoming: HashMap<K, Vec<K>>,
}




// ============================================================================
impl<K, E> AdjacencyList<K, E> where K: Hash + Eq + Clone {


    pub fn new() -> Self {
        Self::default()
    }


    /**
     * Return the number of edges in the graph.
     */
    pub fn len(&self) -> usize {
        self.incoming.values().map(Vec::len).sum()
    }


    /**
     * Determine whether there are any edges in the graph.
     */
    pub fn is_empty(&self) -> bool {
        self.incoming.values().all(Vec::is_empty)
    }


    /**
     * Insert an edge from a -> b with the given payload.
     */
    pub fn insert(&mut self, a: K, b: K, edge: E) {
        self.incoming.entry(b.clone()).or_default().push(a.clone());
        self.outgoing.entry(a).or_default().push((b, edge));
    }


    /**
     * Determine whether at least one edge a -> b exists.
     */
    pub fn contains(&self, a: &K, b: &K) -> bool {
        self.outgoing
            .get(a)
            .map_or(false, |edges| edges.iter().any(|(k, _)| k == b))
    }


    /**
     * Return an iterator over the edges emanating from the given vertex, as
     * (destination, payload) pairs.
     */
    pub fn outgoing_edges(&self, a: &K) -> impl Iterator<Item = (&K, &E)> {
        self.outgoing
            .get(a)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(k, e)| (k, e)))
    }


    /**
     * Return an iterator over the sources of edges pointing to the given
     * vertex, one item per edge.
     */
    pub fn incoming_edges(&self, b: &K) -> impl Iterator<Item = &K> {
        self.incoming.get(b).into_iter().flat_map(|edges| edges.iter())
    }
}

impl<K, E> Default for AdjacencyList<K, E> {
    fn default() -> Self {
        Self {
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }
}
