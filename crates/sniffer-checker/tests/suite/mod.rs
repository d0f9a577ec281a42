mod end_to_end;
mod ignore;
mod parallel;
mod session;
mod suppression;

use sniffer_checker::{ClassSignature, SignatureIndex};

/// `java/lang/Object`, and `java/util/List` declaring only `size()I`.
pub(crate) fn list_baseline() -> SignatureIndex {
    [
        ClassSignature::new("java/lang/Object").with_members(["<init>()V", "toString()Ljava/lang/String;"]),
        ClassSignature::new("java/util/List")
            .with_interfaces(["java/lang/Iterable"])
            .with_members(["size()I"]),
    ]
    .into_iter()
    .collect()
}
