use crate::tracing_targets;

tracing_targets! {
    BUILDER = "builder",
    TRAVERSAL = "traversal",
}
