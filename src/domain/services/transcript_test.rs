use super::TranscriptError;
use super::TranscriptStore;
use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::MessagePatch;
use crate::domain::models::Role;

fn store_with_placeholder() -> (TranscriptStore, MessageId) {
    let mut store = TranscriptStore::new(vec![Message::welcome()]);
    let placeholder = Message::placeholder();
    let id = placeholder.id;
    store.append(Message::user("Nike shoes"));
    store.append(placeholder);

    return (store, id);
}

#[test]
fn it_appends_in_insertion_order() {
    let (store, id) = store_with_placeholder();
    let transcript = store.read();

    assert_eq!(store.len(), 3);
    assert_eq!(transcript[1].role, Role::User);
    assert_eq!(transcript[2].id, id);
    assert_eq!(transcript.streaming_count(), 1);
}

#[test]
fn it_patches_the_streaming_message() {
    let (mut store, id) = store_with_placeholder();
    store.patch(id, MessagePatch::content("Hel")).unwrap();
    store.patch(id, MessagePatch::content("Hello")).unwrap();

    assert_eq!(store.read().get(id).unwrap().content, "Hello");
    assert!(store.read().get(id).unwrap().streaming);
}

#[test]
fn it_rejects_patches_to_finalized_messages() {
    let (mut store, id) = store_with_placeholder();
    store
        .patch(id, MessagePatch::finalize("Done", None))
        .unwrap();

    let res = store.patch(id, MessagePatch::content("Done and more"));
    assert_eq!(res, Err(TranscriptError::NotStreaming(id)));
    assert_eq!(store.read().get(id).unwrap().content, "Done");
}

#[test]
fn it_rejects_patches_to_user_messages() {
    let (mut store, _) = store_with_placeholder();
    let user_id = store.read()[1].id;

    let res = store.patch(user_id, MessagePatch::content("edited"));
    assert_eq!(res, Err(TranscriptError::NotStreaming(user_id)));
}

#[test]
fn it_rejects_unknown_messages() {
    let (mut store, _) = store_with_placeholder();
    let missing = MessageId::next();

    let res = store.patch(missing, MessagePatch::content("hi"));
    assert_eq!(res, Err(TranscriptError::UnknownMessage(missing)));
}

#[test]
fn it_rejects_shrinking_streaming_content() {
    let (mut store, id) = store_with_placeholder();
    store.patch(id, MessagePatch::content("Hello")).unwrap();

    let res = store.patch(id, MessagePatch::content("He"));
    assert_eq!(res, Err(TranscriptError::ContentShrunk(id)));
}

#[test]
fn it_allows_finalizing_with_shorter_content() {
    let (mut store, id) = store_with_placeholder();
    store
        .patch(id, MessagePatch::content("A long partial answer"))
        .unwrap();

    assert!(store.patch(id, MessagePatch::finalize("Error", None)).is_ok());
    assert_eq!(store.read().get(id).unwrap().content, "Error");
}

#[test]
fn it_never_mutates_handed_out_snapshots() {
    let (mut store, id) = store_with_placeholder();
    let before = store.read();

    store.patch(id, MessagePatch::content("Hel")).unwrap();
    let after = store.read();

    assert_eq!(before.get(id).unwrap().content, "");
    assert_eq!(after.get(id).unwrap().content, "Hel");
    assert!(!before.shares_storage(&after));
}

#[test]
fn it_shares_storage_between_unchanged_reads() {
    let (store, _) = store_with_placeholder();
    assert!(store.read().shares_storage(&store.read()));
}

#[test]
fn it_replaces_all_messages() {
    let (mut store, _) = store_with_placeholder();
    let before = store.read();
    store.replace_all(vec![Message::cleared()]);

    assert_eq!(store.len(), 1);
    assert_eq!(store.read().streaming_count(), 0);
    assert_eq!(before.len(), 3);
}
