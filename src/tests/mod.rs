// Whole collections on small heaps, driven through the public API.

mod stress;
