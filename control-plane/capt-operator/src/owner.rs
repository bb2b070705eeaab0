use capt_store::{ObjectKey, ObjectMeta, ObjectStore, StoreError};
use tracing::debug;

use crate::api::Cluster;

/// Result of following a child's owner reference. Both `Unset` and
/// `NotFound` are legitimate intermediate states, not errors: the
/// cluster controller sets the reference, and creation ordering is not
/// guaranteed.
#[derive(Clone, Debug, PartialEq)]
pub enum OwnerLookup {
    Unset,
    NotFound,
    Found(Cluster),
}

/// Follow `child.owner_ref` with exactly one store lookup. The
/// reference's kind is taken at face value; only identity is matched.
pub async fn resolve_owner(
    store: &dyn ObjectStore,
    child: &ObjectMeta,
) -> Result<OwnerLookup, StoreError> {
    let Some(owner_ref) = &child.owner_ref else {
        return Ok(OwnerLookup::Unset);
    };

    let owner_key =
        ObjectKey::new(child.namespace.clone(), owner_ref.name.clone());
    match store.get(&owner_ref.kind, &owner_key).await? {
        Some(record) => Ok(OwnerLookup::Found(Cluster::from_record(&record)?)),
        None => {
            debug!(kind = %owner_ref.kind, key = %owner_key, "owner object not found");
            Ok(OwnerLookup::NotFound)
        }
    }
}
