// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use tandem_utils::id_string;

id_string!(
    /// Identifies a participant of a conversation.
    UserId
);
id_string!(ConversationId);
id_string!(
    /// Server-assigned, immutable message identifier.
    MessageId
);
id_string!(ReactionId);
id_string!(AttachmentId);
id_string!(
    /// Locally assigned identifier of a file that was staged in the composer but not yet
    /// uploaded.
    StagedFileId
);
id_string!(TopicId);
