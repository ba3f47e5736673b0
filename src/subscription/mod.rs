/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 9/1/26
******************************************************************************/

mod model;

pub use model::{
    MAX_SUBSCRIPTIONS_PER_MESSAGE, StreamAction, SubscribeCommand, Subscription, build_batches,
};
